use super::{ActionDefinition as A, Catalog, ParameterDefinition as P};
use crate::parse::types::ValueType::*;

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "emailAddress",
        A::standard("email").params(vec![P::new("email", Text, "WFEmailAddress").infinite()]),
    );
    c.insert(
        "phoneNumber",
        A::standard("phonenumber").params(vec![P::new("number", Text, "WFPhoneNumber").infinite()]),
    );
    c.insert(
        "selectContact",
        A::standard("selectcontacts")
            .params(vec![P::new("multiple", Bool, "WFSelectMultiple").default_value(false)]),
    );
    c.insert("selectEmailAddress", A::standard("selectemail").output(Text));
    c.insert("selectPhoneNumber", A::standard("selectphone").output(Text));
    c.insert(
        "getFromContact",
        A::standard("properties.contacts")
            .params(vec![
                P::new("contact", Variable, "WFInput"),
                P::new("property", Text, "WFContentItemPropertyName").enumerate(&[
                    "First Name",
                    "Middle Name",
                    "Last Name",
                    "Birthday",
                    "Prefix",
                    "Suffix",
                    "Nickname",
                    "Phonetic First Name",
                    "Phonetic Last Name",
                    "Phonetic Middle Name",
                    "Company",
                    "Job Title",
                    "Department",
                ]),
            ])
            .output(Text),
    );
}
