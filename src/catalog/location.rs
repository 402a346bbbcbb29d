//! Location, maps and weather.

use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParameterDefinition as P, fixed};
use crate::parse::types::ValueType::*;

const FORECASTS: &[&str] = &["Daily", "Hourly"];

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "getCurrentLocation",
        A::standard("location")
            .add_params(|_, _| Ok(fixed(&[("WFLocation", json!({ "isCurrentLocation": true }))])))
            .output(Dictionary),
    );
    c.insert(
        "getAddresses",
        A::standard("detect.address")
            .params(vec![P::new("input", Variable, "WFInput")])
            .output(Array),
    );
    c.insert(
        "streetAddress",
        A::standard("address").params(vec![
            P::new("addressLine1", Text, "WFAddressLine1"),
            P::new("addressLine2", Text, "WFAddressLine2"),
            P::new("city", Text, "WFCity"),
            P::new("state", Text, "WFState"),
            P::new("country", Text, "WFCountry"),
            P::new("zipCode", Number, "WFPostalCode"),
        ]),
    );
    c.insert(
        "getLocationDetail",
        A::standard("properties.locations")
            .params(vec![
                P::new("location", Variable, "WFInput"),
                P::new("detail", Text, "WFContentItemPropertyName").enumerate(&[
                    "Name",
                    "URL",
                    "Label",
                    "Phone Number",
                    "Region",
                    "ZIP Code",
                    "State",
                    "City",
                    "Street",
                    "Altitude",
                    "Longitude",
                    "Latitude",
                ]),
            ])
            .output(Text),
    );
    c.insert(
        "openInMaps",
        A::standard("searchmaps").params(vec![P::new("location", Variable, "WFInput")]),
    );
    c.insert(
        "getMapsLink",
        A::standard("getmapslink")
            .params(vec![P::new("location", Variable, "WFInput")])
            .output(Text),
    );
    c.insert(
        "getHalfwayPoint",
        A::standard("gethalfwaypoint")
            .params(vec![
                P::new("firstLocation", Variable, "WFGetHalfwayPointFirstLocation"),
                P::new("secondLocation", Variable, "WFGetHalfwayPointSecondLocation"),
            ])
            .output(Dictionary),
    );

    // Weather

    c.insert(
        "getCurrentWeather",
        A::standard("currentconditions").output(Dictionary),
    );
    c.insert(
        "getCurrentWeatherAt",
        A::standard("currentconditions")
            .params(vec![P::new("location", Variable, "WFWeatherCustomLocation")])
            .output(Dictionary),
    );
    c.insert(
        "getWeatherDetail",
        A::standard("properties.weather.conditions")
            .params(vec![
                P::new("weather", Variable, "WFInput"),
                P::new("detail", Text, "WFContentItemPropertyName").enumerate(&[
                    "Name",
                    "Air Pollutants",
                    "Air Quality Category",
                    "Air Quality Index",
                    "Sunset Time",
                    "Sunrise Time",
                    "UV Index",
                    "Wind Direction",
                    "Wind Speed",
                    "Precipitation Chance",
                    "Precipitation Amount",
                    "Pressure",
                    "Humidity",
                    "Dewpoint",
                    "Visibility",
                    "Condition",
                    "Feels Like",
                    "Low",
                    "High",
                    "Temperature",
                    "Location",
                    "Date",
                ]),
            ])
            .output(Text),
    );
    c.insert(
        "getWeatherForcast",
        A::standard("weather.forecast")
            .params(vec![
                P::new("type", Text, "WFWeatherForecastType")
                    .enumerate(FORECASTS)
                    .default_value("Daily"),
            ])
            .output(Array),
    );
    c.insert(
        "getWeatherForcastAt",
        A::standard("weather.forecast")
            .params(vec![
                P::new("type", Text, "WFWeatherForecastType").enumerate(FORECASTS),
                P::new("location", Variable, "WFInput"),
            ])
            .output(Array),
    );
}
