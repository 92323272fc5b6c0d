//! Fare extraction from the rendered availability page.
//!
//! The vendor renders one card per scheduled departure. Prices are split
//! across two text nodes per offer (integer and decimal part), and each
//! card can carry up to two offer tiers: the standard price and the
//! instant-payment (Pix) price. Both tiers feed the same candidate pool.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One (departure hour, fare) reading from a single run. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareObservation {
    pub departure_hour: u32,
    pub fare: f64,
}

struct CardSelectors {
    card: Selector,
    from_time: Selector,
    /// (integer span, decimal span) selector pairs, one per offer tier.
    offers: [(Selector, Selector); 2],
}

impl CardSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            card: Selector::parse("li.list-companies-item").ok()?,
            from_time: Selector::parse(r#"span[data-js="fromTime"]"#).ok()?,
            offers: [
                (
                    Selector::parse(r#"span[data-js="priceLabel"]"#).ok()?,
                    Selector::parse(r#"span[data-js="decimalLabel"]"#).ok()?,
                ),
                (
                    Selector::parse(r#"span[data-js="priceLabelPix"]"#).ok()?,
                    Selector::parse(r#"span[data-js="decimalLabelPix"]"#).ok()?,
                ),
            ],
        })
    }
}

/// Extracts the lowest fare among departures at the target hours, or
/// `None` when no matching departure has an available price. Pure: a
/// fixed markup and hour set always produce the same quote.
pub fn extract_min_fare(markup: &str, target_hours: &[u32]) -> Option<f64> {
    extract_observations(markup, target_hours)
        .into_iter()
        .map(|observation| observation.fare)
        .reduce(f64::min)
}

/// Collects every valid offer inside cards whose departure hour is in
/// `target_hours`. Cards without a parseable hour and offers with missing
/// or non-numeric price fragments are skipped locally — one broken card
/// never aborts the rest of the page.
pub fn extract_observations(markup: &str, target_hours: &[u32]) -> Vec<FareObservation> {
    let Some(selectors) = CardSelectors::new() else {
        return Vec::new();
    };
    let document = Html::parse_document(markup);

    let mut observations = Vec::new();
    let mut cards = 0usize;

    for card in document.select(&selectors.card) {
        cards += 1;

        let Some(hour) = departure_hour(&card, &selectors.from_time) else {
            continue;
        };
        if !target_hours.contains(&hour) {
            continue;
        }

        for (integer_sel, decimal_sel) in &selectors.offers {
            for fare in offer_prices(&card, integer_sel, decimal_sel) {
                observations.push(FareObservation {
                    departure_hour: hour,
                    fare,
                });
            }
        }
    }

    debug!(cards, matches = observations.len(), "scanned departure cards");
    observations
}

/// Departure hour of one card, matched as a raw integer (midnight is 0).
fn departure_hour(card: &ElementRef, from_time: &Selector) -> Option<u32> {
    let text: String = card.select(from_time).next()?.text().collect();
    text.trim().split(':').next()?.parse().ok()
}

/// Reads every offer of one tier inside a card. The decimal span lives
/// next to the integer span under the same parent; `1.234` integer parts
/// drop the thousands separator and `,56` decimal parts drop the comma.
fn offer_prices(card: &ElementRef, integer_sel: &Selector, decimal_sel: &Selector) -> Vec<f64> {
    let mut prices = Vec::new();

    for label in card.select(integer_sel) {
        let Some(parent) = label.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let Some(decimal) = parent.select(decimal_sel).next() else {
            continue;
        };

        let integer_part = label.text().collect::<String>().trim().replace('.', "");
        let decimal_part = decimal.text().collect::<String>().trim().replace(',', "");
        if integer_part.is_empty() || decimal_part.is_empty() {
            continue;
        }

        if let Ok(value) = format!("{integer_part}.{decimal_part}").parse::<f64>() {
            prices.push(value);
        }
    }

    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(tier: &str, integer: &str, decimal: &str) -> String {
        let (label, dec) = match tier {
            "pix" => ("priceLabelPix", "decimalLabelPix"),
            _ => ("priceLabel", "decimalLabel"),
        };
        format!(
            r#"<div class="price">
                 <span data-js="{label}">{integer}</span>
                 <span data-js="{dec}">{decimal}</span>
               </div>"#
        )
    }

    fn card(time: &str, offers: &[String]) -> String {
        format!(
            r#"<li class="list-companies-item">
                 <span data-js="fromTime">{time}</span>
                 {}
               </li>"#,
            offers.join("\n")
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><ul>{}</ul></body></html>", cards.join("\n"))
    }

    #[test]
    fn test_minimum_across_cards() {
        let markup = page(&[
            card("22:00", &[offer("std", "120", ",50")]),
            card("23:30", &[offer("std", "99", ",90")]),
            card("22:45", &[offer("std", "150", ",00")]),
        ]);
        assert_eq!(extract_min_fare(&markup, &[22, 23]), Some(99.90));
    }

    #[test]
    fn test_hours_outside_target_are_excluded() {
        let markup = page(&[
            card("08:00", &[offer("std", "10", ",00")]),
            card("22:00", &[offer("std", "180", ",00")]),
        ]);
        // The 08:00 card is cheaper but not in the target set.
        assert_eq!(extract_min_fare(&markup, &[22, 23, 0]), Some(180.00));
    }

    #[test]
    fn test_midnight_matches_hour_zero() {
        let markup = page(&[card("00:15", &[offer("std", "75", ",00")])]);
        assert_eq!(extract_min_fare(&markup, &[0]), Some(75.00));
        assert_eq!(extract_min_fare(&markup, &[24]), None);
    }

    #[test]
    fn test_pix_offers_join_the_candidate_pool() {
        let markup = page(&[card(
            "22:00",
            &[offer("std", "177", ",74"), offer("pix", "168", ",85")],
        )]);
        assert_eq!(extract_min_fare(&markup, &[22]), Some(168.85));
    }

    #[test]
    fn test_thousands_separator_is_dropped() {
        let markup = page(&[card("22:00", &[offer("std", "1.234", ",56")])]);
        assert_eq!(extract_min_fare(&markup, &[22]), Some(1234.56));
    }

    #[test]
    fn test_malformed_offer_does_not_abort_other_cards() {
        let missing_decimal = r#"<div><span data-js="priceLabel">120</span></div>"#.to_string();
        let markup = page(&[
            card("22:00", &[missing_decimal, offer("std", "abc", ",99")]),
            card("23:00", &[offer("std", "140", ",00")]),
        ]);
        assert_eq!(extract_min_fare(&markup, &[22, 23]), Some(140.00));
    }

    #[test]
    fn test_sold_out_card_contributes_nothing() {
        let markup = page(&[
            card("22:00", &[]),
            card("23:00", &[offer("std", "200", ",00")]),
        ]);
        let observations = extract_observations(&markup, &[22, 23]);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].departure_hour, 23);
    }

    #[test]
    fn test_card_without_time_is_skipped() {
        let timeless = format!(
            r#"<li class="list-companies-item">{}</li>"#,
            offer("std", "50", ",00")
        );
        let markup = page(&[timeless, card("22:00", &[offer("std", "90", ",00")])]);
        assert_eq!(extract_min_fare(&markup, &[22]), Some(90.00));
    }

    #[test]
    fn test_no_matching_fare_is_none() {
        let markup = page(&[card("10:00", &[offer("std", "60", ",00")])]);
        assert_eq!(extract_min_fare(&markup, &[22, 23]), None);
        assert_eq!(extract_min_fare("<html></html>", &[22]), None);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let markup = page(&[
            card("22:00", &[offer("std", "120", ",50"), offer("pix", "99", ",90")]),
            card("23:00", &[offer("std", "150", ",00")]),
        ]);
        let first = extract_min_fare(&markup, &[22, 23]);
        for _ in 0..10 {
            assert_eq!(extract_min_fare(&markup, &[22, 23]), first);
        }
    }
}
