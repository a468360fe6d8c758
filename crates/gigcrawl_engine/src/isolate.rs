use scraper::{Html, Selector};

use crate::ContentFragment;

/// Selectors tried, in priority order, when no per-source list is configured.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &["main", "#content", ".events", ".program"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content selector {selector:?}: {message}")]
pub struct IsolatorError {
    pub selector: String,
    pub message: String,
}

/// Picks the region of a listing page most likely to hold the events.
///
/// All selectors are matched as one group, and the first matching element in
/// document order wins, whichever selector matched it. If that element's
/// inner markup is blank the page has no content. Parsing is best-effort, so
/// malformed HTML never fails.
#[derive(Debug, Clone)]
pub struct ContentIsolator {
    selectors: Vec<(String, Selector)>,
    group: Option<Selector>,
}

impl ContentIsolator {
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Result<Self, IsolatorError> {
        let selectors = selectors
            .iter()
            .map(|raw| {
                let raw = raw.as_ref().trim();
                Selector::parse(raw)
                    .map(|sel| (raw.to_string(), sel))
                    .map_err(|err| IsolatorError {
                        selector: raw.to_string(),
                        message: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if selectors.is_empty() {
            return Err(IsolatorError {
                selector: String::new(),
                message: "selector list is empty".to_string(),
            });
        }

        let joined = join(&selectors);
        let group = Selector::parse(&joined).map_err(|err| IsolatorError {
            selector: joined.clone(),
            message: err.to_string(),
        })?;
        Ok(Self {
            selectors,
            group: Some(group),
        })
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(|(raw, _)| raw.as_str())
    }

    pub fn isolate(&self, html: &str) -> Option<ContentFragment> {
        let group = self.group.as_ref()?;
        let doc = Html::parse_document(html);
        let node = doc.select(group).next()?;
        let inner = node.inner_html();
        if inner.trim().is_empty() {
            return None;
        }

        let selector = self
            .selectors
            .iter()
            .find(|(_, sel)| sel.matches(&node))
            .map(|(raw, _)| raw.clone())
            .unwrap_or_default();
        Some(ContentFragment {
            selector,
            html: inner,
        })
    }
}

fn join(selectors: &[(String, Selector)]) -> String {
    selectors
        .iter()
        .map(|(raw, _)| raw.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Default for ContentIsolator {
    fn default() -> Self {
        let selectors: Vec<_> = DEFAULT_CONTENT_SELECTORS
            .iter()
            .filter_map(|raw| Selector::parse(raw).ok().map(|sel| (raw.to_string(), sel)))
            .collect();
        let group = Selector::parse(&join(&selectors)).ok();
        Self { selectors, group }
    }
}
