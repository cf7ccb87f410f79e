// src/extractors/person/contacts.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::Parsed;
use crate::models::{non_empty, Contact};
use crate::utils::text::{element_text, href};

/// Connections list of the signed-in member.
pub const CONNECTIONS_PATH: &str = "mynetwork/invite-connect/connections/";
pub const CONNECTIONS_SELECTOR: &str = ".mn-connections";

static CONNECTIONS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(CONNECTIONS_SELECTOR).expect("Failed to compile CONNECTIONS")
});

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse(".mn-connection-card").expect("Failed to compile CARD"));

static CARD_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".mn-connection-card__link").expect("Failed to compile CARD_LINK")
});

static CARD_NAME: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".mn-connection-card__details .mn-connection-card__name").expect("Failed to compile CARD_NAME")
});

static CARD_OCCUPATION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".mn-connection-card__details .mn-connection-card__occupation")
        .expect("Failed to compile CARD_OCCUPATION")
});

pub fn parse_contacts(html: &str) -> Parsed<Contact> {
    let document = Html::parse_document(html);
    let Some(connections) = document.select(&CONNECTIONS).next() else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for card in connections.select(&CARD) {
        parsed.push(parse_card(card));
    }
    parsed
}

fn parse_card(card: ElementRef) -> Option<Contact> {
    let name = card.select(&CARD_NAME).next().map(element_text).and_then(non_empty)?;
    Some(Contact {
        name,
        occupation: card.select(&CARD_OCCUPATION).next().map(element_text).and_then(non_empty),
        url: card.select(&CARD_LINK).next().and_then(href),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::SectionOutcome;

    #[test]
    fn test_connection_cards() {
        let html = r#"<ul class="mn-connections">
            <li class="mn-connection-card">
              <a class="mn-connection-card__link" href="https://site.test/in/ada/"></a>
              <div class="mn-connection-card__details">
                <span class="mn-connection-card__name"> Ada Lovelace </span>
                <span class="mn-connection-card__occupation">Analyst at Engines Ltd</span>
              </div>
            </li>
            <li class="mn-connection-card"><div class="mn-connection-card__details"></div></li>
        </ul>"#;
        let parsed = parse_contacts(html);
        assert_eq!(parsed.outcome(), SectionOutcome::Extracted { items: 1, skipped: 1 });
        assert_eq!(
            parsed.items[0],
            Contact {
                name: "Ada Lovelace".into(),
                occupation: Some("Analyst at Engines Ltd".into()),
                url: Some("https://site.test/in/ada/".into()),
            }
        );
    }
}
