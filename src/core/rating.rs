use crate::domain::document::Document;
use crate::utils::error::Result;

pub const RATING_VALUE_ID: &str = "rating-value";
pub const STAR_CLASS: &str = "star";
pub const ACTIVE_CLASS: &str = "active";

/// Writes `rating` into the hidden field and lights star `i` iff `i < rating`.
/// Out-of-range ratings are not clamped.
pub fn set_rating(doc: &mut Document, rating: i64) -> Result<()> {
    let field = doc.require_by_id(RATING_VALUE_ID)?;
    doc.element_mut(field)?.set_value(rating.to_string());

    for (index, star) in doc.query_class(STAR_CLASS).into_iter().enumerate() {
        doc.element_mut(star)?
            .toggle_class(ACTIVE_CLASS, (index as i64) < rating);
    }
    Ok(())
}

pub fn active_star_count(doc: &Document) -> usize {
    doc.query_class(STAR_CLASS)
        .into_iter()
        .filter(|star| {
            doc.element(*star)
                .map(|el| el.has_class(ACTIVE_CLASS))
                .unwrap_or(false)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{ElementSpec, NodeId};

    fn rating_doc(stars: usize) -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let field = doc
            .append_new(
                body,
                ElementSpec::new("input")
                    .id(RATING_VALUE_ID)
                    .attr("type", "hidden"),
            )
            .unwrap();
        let stars = (0..stars)
            .map(|_| {
                doc.append_new(body, ElementSpec::new("span").class(STAR_CLASS))
                    .unwrap()
            })
            .collect();
        (doc, field, stars)
    }

    #[test]
    fn test_active_count_matches_clamped_rating() {
        for rating in [-2i64, 0, 1, 3, 5, 7] {
            let (mut doc, field, _) = rating_doc(5);
            set_rating(&mut doc, rating).unwrap();

            assert_eq!(active_star_count(&doc), rating.clamp(0, 5) as usize);
            assert_eq!(doc.element(field).unwrap().value(), rating.to_string());
        }
    }

    #[test]
    fn test_prefix_of_stars_is_active() {
        let (mut doc, _, stars) = rating_doc(5);
        set_rating(&mut doc, 5).unwrap();
        set_rating(&mut doc, 2).unwrap();

        let active: Vec<bool> = stars
            .iter()
            .map(|s| doc.element(*s).unwrap().has_class(ACTIVE_CLASS))
            .collect();
        assert_eq!(active, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_missing_hidden_field_fails() {
        let mut doc = Document::new();
        assert!(set_rating(&mut doc, 3).is_err());
    }
}
