use crate::config::ViewerConfig;
use crate::effects::Effect;
use crate::geometry::Size;
use crate::loader::LoadToken;
use crate::viewer::Viewer;
use doc_model::{PagePayload, PageRecord, Preferences};

pub(crate) const VIEWPORT: Size = Size { width: 1000.0, height: 800.0 };

pub(crate) fn payload(pages: usize) -> PagePayload {
    let images = (0..pages)
        .map(|i| {
            let src = format!("https://img.test/{i}.jpg");
            PageRecord::new(format!("p{i}"), src, format!("{i}.jpg"))
        })
        .collect();
    PagePayload::new(images, Some("Test Book".to_owned()))
}

pub(crate) fn start(pages: usize) -> Viewer {
    start_with(payload(pages), Preferences::default())
}

pub(crate) fn start_with(payload: PagePayload, preferences: Preferences) -> Viewer {
    Viewer::start(payload, preferences, VIEWPORT, ViewerConfig::default())
        .expect("non-empty payload")
}

pub(crate) fn fetches(effects: &[Effect]) -> Vec<(LoadToken, usize)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchImage { token, page_index, .. } => Some((*token, *page_index)),
            _ => None,
        })
        .collect()
}
