// src/extractors/person/experience.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::fields::{self, WorkTimes, MIDDLE_DOT};
use crate::extractors::Parsed;
use crate::models::{non_empty, Experience};
use crate::utils::text::{element_children, element_text, first_element_child, href, outermost, unique_span_texts};

use super::{main_list, row_text, LIST_CONTAINER_CLASS, LIST_ITEM};

pub(super) static ENTITY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div[data-view-name='profile-component-entity']").expect("Failed to compile ENTITY")
});

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Failed to compile ANCHOR"));

static NESTED_LIST: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".pvs-list__container").expect("Failed to compile NESTED_LIST")
});

/// Shapes of the summary block of one experience entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionLayout {
    /// title, employer, dates, location
    Full,
    /// title, employer, dates
    NoLocation,
    /// employer, total tenure, location; the titles live in nested positions
    Grouped,
    /// anything else: employer and dates when present
    Sparse,
}

impl PositionLayout {
    pub fn classify(rows: &[ElementRef]) -> Self {
        match rows.len() {
            4 => PositionLayout::Full,
            3 if element_text(rows[2]).contains(MIDDLE_DOT) => PositionLayout::NoLocation,
            3 => PositionLayout::Grouped,
            _ => PositionLayout::Sparse,
        }
    }
}

#[derive(Debug, Default)]
struct PositionSummary {
    title: Option<String>,
    employer: Option<String>,
    times: WorkTimes,
    location: Option<String>,
}

fn summarize(layout: PositionLayout, rows: &[ElementRef]) -> PositionSummary {
    let text_at = |i: usize| rows.get(i).map(|row| row_text(*row)).and_then(non_empty);
    let times_at = |i: usize| text_at(i).map(|label| fields::parse_work_times(&label)).unwrap_or_default();
    match layout {
        PositionLayout::Full => PositionSummary {
            title: text_at(0),
            employer: text_at(1),
            times: times_at(2),
            location: text_at(3),
        },
        PositionLayout::NoLocation => PositionSummary {
            title: text_at(0),
            employer: text_at(1),
            times: times_at(2),
            location: None,
        },
        PositionLayout::Grouped => PositionSummary {
            title: None,
            employer: text_at(0),
            times: times_at(1),
            location: text_at(2),
        },
        PositionLayout::Sparse => PositionSummary {
            title: None,
            employer: text_at(0),
            times: times_at(1),
            location: None,
        },
    }
}

/// Parses the `details/experience` page.
pub fn parse_experiences(html: &str) -> Parsed<Experience> {
    let document = Html::parse_document(html);
    let Some(list) = main_list(&document) else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for item in outermost(list, &LIST_ITEM) {
        match parse_entry(item) {
            Some((experiences, failed_positions)) => {
                parsed.items.extend(experiences);
                parsed.skipped += failed_positions;
            }
            None => {
                tracing::trace!("Skipping experience entry without the expected shape");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

/// One list entry: a single position, or one employer with several positions.
/// The count is the number of nested positions that did not parse.
fn parse_entry(item: ElementRef) -> Option<(Vec<Experience>, usize)> {
    let entity = item.select(&ENTITY).next()?;
    let children = element_children(entity);
    if children.len() < 2 {
        return None;
    }

    let employer_url = first_element_child(children[0]).and_then(href)?;

    let details = element_children(children[1]);
    let summary = *details.first()?;
    let summary_text = details.get(1).copied();
    let rows = element_children(first_element_child(summary)?);
    let head = summarize(PositionLayout::classify(&rows), &rows);

    let inner = summary_text.map(inner_positions).unwrap_or_default();
    if inner.len() > 1 {
        let total = inner.len();
        let positions: Vec<Experience> = inner
            .into_iter()
            .filter_map(|position| parse_inner_position(position, &head.employer, &employer_url))
            .collect();
        let failed = total - positions.len();
        if failed > 0 {
            tracing::trace!("{} nested positions without the expected shape", failed);
        }
        return Some((positions, failed));
    }

    let single = Experience {
        position_title: head.title,
        employer_name: head.employer,
        employer_url: Some(employer_url),
        from_date: head.times.from,
        to_date: head.times.to,
        duration: head.times.duration,
        location: head.location,
        description: summary_text.and_then(description_text),
    };
    Some((vec![single], 0))
}

/// Positions nested under a grouped employer entry.
fn inner_positions(summary_text: ElementRef) -> Vec<ElementRef> {
    let nested = element_children(summary_text).into_iter().find(|child| {
        child
            .value()
            .classes()
            .any(|class| class == LIST_CONTAINER_CLASS)
    });
    match nested {
        Some(container) => outermost(container, &LIST_ITEM),
        None => summary_text
            .select(&NESTED_LIST)
            .next()
            .map(|container| outermost(container, &LIST_ITEM))
            .unwrap_or_default(),
    }
}

fn parse_inner_position(
    position: ElementRef,
    employer: &Option<String>,
    employer_url: &str,
) -> Option<Experience> {
    let anchor = position.select(&ANCHOR).next()?;
    let rows = element_children(anchor);
    let text_at = |i: usize| rows.get(i).map(|row| row_text(*row)).and_then(non_empty);

    let title = text_at(0);
    let times = text_at(1).map(|label| fields::parse_work_times(&label)).unwrap_or_default();
    if title.is_none() && times.from.is_none() {
        return None;
    }

    let heading = unique_span_texts(anchor);
    let description: Vec<String> = unique_span_texts(position)
        .into_iter()
        .filter(|text| !heading.contains(text))
        .collect();

    Some(Experience {
        position_title: title,
        employer_name: employer.clone(),
        employer_url: Some(employer_url.to_string()),
        from_date: times.from,
        to_date: times.to,
        duration: times.duration,
        location: text_at(2),
        description: non_empty(description.join("\n")),
    })
}

/// Free text below the summary, deduplicated when rendered with accessible copies.
pub(super) fn description_text(element: ElementRef) -> Option<String> {
    let texts = unique_span_texts(element);
    if texts.is_empty() {
        non_empty(element_text(element))
    } else {
        non_empty(texts.join("\n"))
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::extractors::SectionOutcome;

    pub(crate) const EXPERIENCE_PAGE: &str = r#"
        <html><body><main>
          <section><div class="pvs-list__container"><ul>
            <li class="pvs-list__paged-list-item">
              <div data-view-name="profile-component-entity">
                <div><a href="https://www.linkedin.com/company/1001/"><img alt="Acme logo"></a></div>
                <div>
                  <div><div>
                    <div><span aria-hidden="true">Staff Engineer</span><span class="visually-hidden">Staff Engineer</span></div>
                    <span><span aria-hidden="true">Acme Corp · Full-time</span><span class="visually-hidden">Acme Corp · Full-time</span></span>
                    <span><span aria-hidden="true">Jan 2020 - Mar 2022 · 2 yrs 2 mos</span></span>
                    <span><span aria-hidden="true">Berlin, Germany</span></span>
                  </div></div>
                  <div><ul><li><span aria-hidden="true">Built the billing pipeline.</span><span class="visually-hidden">Built the billing pipeline.</span></li></ul></div>
                </div>
              </div>
            </li>
            <li class="pvs-list__paged-list-item">
              <div data-view-name="profile-component-entity">
                <div><a href="https://www.linkedin.com/company/2002/"><img alt="Globex logo"></a></div>
                <div>
                  <div><div>
                    <div><span aria-hidden="true">Software Engineer</span></div>
                    <span><span aria-hidden="true">Globex</span></span>
                    <span><span aria-hidden="true">Jun 2016 - Dec 2019 · 3 yrs 7 mos</span></span>
                  </div></div>
                </div>
              </div>
            </li>
          </ul></div></section>
        </main></body></html>
    "#;

    const GROUPED_PAGE: &str = r#"
        <html><body><main><div class="pvs-list__container"><ul>
          <li class="pvs-list__paged-list-item">
            <div data-view-name="profile-component-entity">
              <div><a href="https://www.linkedin.com/company/3003/"><img></a></div>
              <div>
                <div><div>
                  <div><span aria-hidden="true">Initech</span></div>
                  <span><span aria-hidden="true">Full-time · 6 yrs</span></span>
                  <span><span aria-hidden="true">Austin, Texas</span></span>
                </div></div>
                <div>
                  <div class="pvs-list__container"><div><div><ul>
                    <li class="pvs-list__paged-list-item"><a href="/x">
                      <div><span aria-hidden="true">Engineering Manager</span></div>
                      <span><span aria-hidden="true">Jan 2021 - Present · 3 yrs</span></span>
                      <span><span aria-hidden="true">Remote</span></span>
                    </a><div><span aria-hidden="true">Led two teams.</span></div></li>
                    <li class="pvs-list__paged-list-item"><a href="/y">
                      <div><span aria-hidden="true">Senior Engineer</span></div>
                      <span><span aria-hidden="true">Jan 2018 - Dec 2020 · 3 yrs</span></span>
                    </a></li>
                  </ul></div></div></div>
                </div>
              </div>
            </div>
          </li>
          <li class="pvs-list__paged-list-item">
            <div data-view-name="profile-component-entity">
              <div><span>No company page</span></div>
              <div><div><div><span>Freelance</span></div></div></div>
            </div>
          </li>
        </ul></div></main></body></html>
    "#;

    #[test]
    fn test_single_positions() {
        let parsed = parse_experiences(EXPERIENCE_PAGE);
        assert_eq!(parsed.outcome(), SectionOutcome::Extracted { items: 2, skipped: 0 });

        let first = &parsed.items[0];
        assert_eq!(first.position_title.as_deref(), Some("Staff Engineer"));
        assert_eq!(first.employer_name.as_deref(), Some("Acme Corp · Full-time"));
        assert_eq!(first.employer_url.as_deref(), Some("https://www.linkedin.com/company/1001/"));
        assert_eq!(first.from_date.as_deref(), Some("Jan 2020"));
        assert_eq!(first.to_date.as_deref(), Some("Mar 2022"));
        assert_eq!(first.duration.as_deref(), Some("2 yrs 2 mos"));
        assert_eq!(first.location.as_deref(), Some("Berlin, Germany"));
        assert_eq!(first.description.as_deref(), Some("Built the billing pipeline."));

        let second = &parsed.items[1];
        assert_eq!(second.position_title.as_deref(), Some("Software Engineer"));
        assert_eq!(second.employer_name.as_deref(), Some("Globex"));
        assert_eq!(second.location, None);
        assert_eq!(second.description, None);
    }

    #[test]
    fn test_grouped_employer_expands_positions_and_skips_unlinked_entries() {
        let parsed = parse_experiences(GROUPED_PAGE);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.items.len(), 2);

        let manager = &parsed.items[0];
        assert_eq!(manager.position_title.as_deref(), Some("Engineering Manager"));
        assert_eq!(manager.employer_name.as_deref(), Some("Initech"));
        assert_eq!(manager.employer_url.as_deref(), Some("https://www.linkedin.com/company/3003/"));
        assert_eq!(manager.to_date.as_deref(), Some("Present"));
        assert_eq!(manager.location.as_deref(), Some("Remote"));
        assert_eq!(manager.description.as_deref(), Some("Led two teams."));

        let senior = &parsed.items[1];
        assert_eq!(senior.position_title.as_deref(), Some("Senior Engineer"));
        assert_eq!(senior.from_date.as_deref(), Some("Jan 2018"));
        assert_eq!(senior.location, None);
    }

    #[test]
    fn test_unreadable_nested_positions_count_as_skipped() {
        let html = r#"
            <html><body><main><div class="pvs-list__container"><ul>
              <li class="pvs-list__paged-list-item">
                <div data-view-name="profile-component-entity">
                  <div><a href="https://www.linkedin.com/company/4004/"><img></a></div>
                  <div>
                    <div><div>
                      <div><span aria-hidden="true">Hooli</span></div>
                      <span><span aria-hidden="true">Full-time · 4 yrs</span></span>
                      <span><span aria-hidden="true">Palo Alto</span></span>
                    </div></div>
                    <div>
                      <div class="pvs-list__container"><ul>
                        <li class="pvs-list__paged-list-item"><div><span>Redacted</span></div></li>
                        <li class="pvs-list__paged-list-item"><div><span>Redacted</span></div></li>
                      </ul></div>
                    </div>
                  </div>
                </div>
              </li>
            </ul></div></main></body></html>
        "#;
        let parsed = parse_experiences(html);
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.outcome(), SectionOutcome::Extracted { items: 0, skipped: 2 });
    }

    #[test]
    fn test_layout_classification() {
        let html = Html::parse_fragment(
            r#"<div id="a"><p>x</p><p>y</p><p>Jan 2020 · 1 yr</p></div><div id="b"><p>x</p><p>y</p><p>Paris</p></div>"#,
        );
        let rows_of = |id: &str| {
            let sel = Selector::parse(id).unwrap();
            element_children(html.select(&sel).next().unwrap())
        };
        assert_eq!(PositionLayout::classify(&rows_of("#a")), PositionLayout::NoLocation);
        assert_eq!(PositionLayout::classify(&rows_of("#b")), PositionLayout::Grouped);
        assert_eq!(PositionLayout::classify(&[]), PositionLayout::Sparse);
    }

    #[test]
    fn test_missing_list_is_anchor_missing() {
        let parsed = parse_experiences("<html><body><main><p>Loading</p></main></body></html>");
        assert_eq!(parsed.outcome(), SectionOutcome::AnchorMissing);
    }
}
