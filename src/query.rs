//! Vendor availability query construction.
//!
//! The same configuration must always produce the same URL: the link is
//! reused verbatim in price-drop alerts, and the tests depend on it.

use url::form_urlencoded;

use crate::config::{SearchConfig, TRAVEL_DATE_FORMAT};

/// Vendor availability endpoint.
pub const AVAILABILITY_URL: &str = "https://www.autoviacao1001.com.br/disponibilidade";

/// Builds the search URL for one itinerary. Pure and deterministic:
/// parameters are emitted in a fixed order with the vendor's wire names.
///
/// `num_chda` (lap children) is pinned to 0 — the dashboard only exposes
/// the seated child tier, which maps to `num_chds`.
pub fn build_search_url(config: &SearchConfig) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(
            "data_ida",
            &config.travel_date.format(TRAVEL_DATE_FORMAT).to_string(),
        )
        .append_pair("origem_id", &config.origin_id)
        .append_pair("destino_id", &config.destination_id)
        .append_pair("num_psgr", &config.adults.to_string())
        .append_pair("num_chda", "0")
        .append_pair("num_chds", &config.children.to_string())
        .append_pair("deep", "true")
        .finish();

    format!("{AVAILABILITY_URL}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_config() -> SearchConfig {
        SearchConfig {
            travel_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            origin_id: "14245".into(),
            destination_id: "14199".into(),
            adults: 3,
            children: 1,
            teens: 0,
            target_hours: vec![22, 23, 0],
            active: true,
        }
    }

    #[test]
    fn test_build_search_url() {
        let url = build_search_url(&sample_config());
        assert_eq!(
            url,
            "https://www.autoviacao1001.com.br/disponibilidade\
             ?data_ida=10022026\
             &origem_id=14245\
             &destino_id=14199\
             &num_psgr=3\
             &num_chda=0\
             &num_chds=1\
             &deep=true"
        );
    }

    #[test]
    fn test_build_search_url_is_deterministic() {
        let config = sample_config();
        assert_eq!(build_search_url(&config), build_search_url(&config));
    }

    #[test]
    fn test_travel_date_zero_padding() {
        let mut config = sample_config();
        config.travel_date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let url = build_search_url(&config);
        assert!(url.contains("data_ida=05032026"));
    }
}
