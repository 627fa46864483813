//! Canonical geocode requests.

use url::form_urlencoded;

use crate::config::GeocodeOptions;

/// One request to the geocoding service.
///
/// Equality of requests is equality of [`GeocodeRequest::cache_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest {
    pub locality: String,
    pub country: String,
    pub state_province: String,
    pub county: String,
    pub options: GeocodeOptions,
}

impl GeocodeRequest {
    pub fn new(
        locality: &str,
        country: &str,
        state_province: &str,
        county: &str,
        options: GeocodeOptions,
    ) -> Self {
        GeocodeRequest {
            locality: locality.to_string(),
            country: country.to_string(),
            state_province: state_province.to_string(),
            county: county.to_string(),
            options,
        }
    }

    /// URL-encoded parameter string in a fixed order.
    ///
    /// Sent verbatim as the form body and used as the response cache key, so
    /// the parameter order and the boolean spelling must never change.
    pub fn cache_key(&self) -> String {
        let o = &self.options;
        form_urlencoded::Serializer::new(String::new())
            .append_pair("country", &self.country)
            .append_pair("locality", &self.locality)
            .append_pair("state", &self.state_province)
            .append_pair("county", &self.county)
            .append_pair("hwyX", bool_param(o.exclude_highways))
            .append_pair("enableH2O", bool_param(o.enable_water_bodies))
            .append_pair("doUncert", bool_param(o.compute_uncertainty))
            .append_pair("doPoly", bool_param(o.compute_polygon))
            .append_pair("displacePoly", bool_param(o.displace_polygon))
            .append_pair("languageKey", &o.language_key.to_string())
            .append_pair("fmt", "json")
            .finish()
    }
}

fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
