//! Job card filtering, sorting and map plotting.
//!
//! Cards are `.job-card` elements whose criteria live in `data-*`
//! attributes: `category`, `rate`, `distance`, `title`, `lat`, `lng`.

use crate::core::map_control::MapController;
use crate::domain::document::{Display, Document, Element, NodeId};
use crate::domain::model::{parse_int_prefix, JobFilter, JobSort, LatLng};
use crate::domain::ports::MapSurface;
use crate::utils::error::Result;
use crate::utils::geo;

pub const JOB_CARD_CLASS: &str = "job-card";

/// Parsed view of a job card's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct JobCard {
    pub title: String,
    pub category: Option<String>,
    pub rate: Option<i64>,
    pub distance: Option<i64>,
    pub position: Option<LatLng>,
}

impl JobCard {
    pub fn from_element(element: &Element) -> Self {
        // NaN、inf 與超出範圍的座標都當作沒有座標
        let coordinate = |key: &str, limit: f64| {
            element
                .dataset(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && v.abs() <= limit)
        };
        let position = match (coordinate("lat", 90.0), coordinate("lng", 180.0)) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        };

        Self {
            title: element
                .dataset("title")
                .unwrap_or_else(|| element.text())
                .to_string(),
            category: element.dataset("category").map(str::to_string),
            rate: element.dataset("rate").and_then(parse_int_prefix),
            distance: element.dataset("distance").and_then(parse_int_prefix),
            position,
        }
    }

    /// Unset criteria pass; a set criterion fails on a missing or malformed
    /// attribute.
    pub fn matches(&self, filter: &JobFilter) -> bool {
        if let Some(category) = &filter.category {
            if self.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        if let Some(min_rate) = filter.min_rate {
            if !self.rate.is_some_and(|rate| rate >= min_rate) {
                return false;
            }
        }

        if let Some(max_distance) = filter.max_distance {
            if !self.distance.is_some_and(|d| d <= max_distance) {
                return false;
            }
        }

        if let Some(keyword) = &filter.keyword {
            if !self
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase())
            {
                return false;
            }
        }

        true
    }
}

/// Shows or hides every job card. Returns the number of visible cards.
pub fn filter_jobs(doc: &mut Document, filter: &JobFilter) -> Result<usize> {
    let mut visible_count = 0;

    for node in doc.query_class(JOB_CARD_CLASS) {
        let element = doc.element_mut(node)?;
        let visible = JobCard::from_element(element).matches(filter);
        element.set_display(if visible {
            Display::Block
        } else {
            Display::None
        });
        if visible {
            visible_count += 1;
        }
    }

    tracing::debug!("Filter {:?} left {} cards visible", filter, visible_count);
    Ok(visible_count)
}

/// Cards not hidden by a filter, in document order.
pub fn visible_cards(doc: &Document) -> Result<Vec<(NodeId, JobCard)>> {
    let mut cards = Vec::new();
    for node in doc.query_class(JOB_CARD_CLASS) {
        let element = doc.element(node)?;
        if element.display() != Some(Display::None) {
            cards.push((node, JobCard::from_element(element)));
        }
    }
    Ok(cards)
}

/// Writes `data-distance` (whole kilometers from `origin`) on every card that
/// has coordinates. Returns the number of annotated cards.
pub fn annotate_job_distances(doc: &mut Document, origin: LatLng) -> Result<usize> {
    let mut annotated = 0;
    for node in doc.query_class(JOB_CARD_CLASS) {
        let element = doc.element_mut(node)?;
        if let Some(position) = JobCard::from_element(element).position {
            let km = geo::distance_km(origin, position).round() as i64;
            element.set_dataset("distance", km.to_string());
            annotated += 1;
        }
    }
    Ok(annotated)
}

/// Reorders cards within their parents. Cards missing the sort key keep
/// their relative order after the others.
pub fn sort_jobs(doc: &mut Document, order: JobSort) -> Result<()> {
    let mut cards = Vec::new();
    for node in doc.query_class(JOB_CARD_CLASS) {
        let card = JobCard::from_element(doc.element(node)?);
        let key = match order {
            // 用 i128 反轉，i64::MIN 取負不會溢位
            JobSort::RateHighToLow => card.rate.map(|r| -i128::from(r)),
            JobSort::RateLowToHigh => card.rate.map(i128::from),
            JobSort::Distance => card.distance.map(i128::from),
        };
        cards.push((node, key));
    }

    // None 排在最後，sort_by_key 為穩定排序
    cards.sort_by_key(|(_, key)| (key.is_none(), *key));

    for (node, _) in cards {
        if let Some(parent) = doc.parent(node)? {
            doc.append_child(parent, node)?;
        }
    }
    Ok(())
}

/// Replaces the map markers with one marker per visible card that has
/// coordinates. With an `origin`, also marks "Your Location" and redraws
/// the search radius. Returns the number of job markers.
pub fn plot_jobs<M: MapSurface>(
    doc: &Document,
    map: &mut MapController<M>,
    origin: Option<LatLng>,
    radius_km: Option<f64>,
) -> Result<usize> {
    map.clear_markers();

    if let Some(origin) = origin {
        map.add_marker(origin.lat, origin.lng, Some("Your Location"))?;
        map.clear_service_areas();
        if let Some(radius) = radius_km.filter(|r| *r > 0.0) {
            map.draw_service_area(origin, radius)?;
        }
    }

    let mut plotted = 0;
    for (_, card) in visible_cards(doc)? {
        let Some(position) = card.position else {
            continue;
        };

        let mut popup = card.title.clone();
        if let Some(rate) = card.rate {
            popup.push_str(&format!("<br>${}/hr", rate));
        }
        if let Some(origin) = origin {
            popup.push_str(&format!(
                "<br>{:.1} km from you",
                geo::distance_km(origin, position)
            ));
        }

        map.add_marker(position.lat, position.lng, Some(&popup))?;
        plotted += 1;
    }

    tracing::debug!("Plotted {} jobs on the map", plotted);
    Ok(plotted)
}
