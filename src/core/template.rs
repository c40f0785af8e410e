use crate::core::forms::SERVICES_CONTAINER_ID;
use crate::core::job_filter::JOB_CARD_CLASS;
use crate::core::media::IMAGE_PREVIEW_ID;
use crate::core::messaging::CHAT_MESSAGES_CLASS;
use crate::core::page::{
    CATEGORY_FILTER_ID, FILTER_INPUT_CLASS, KEYWORD_FILTER_ID, MAP_ID, MAX_DISTANCE_FILTER_ID,
    MIN_RATE_FILTER_ID,
};
use crate::core::rating::{RATING_VALUE_ID, STAR_CLASS};
use crate::domain::document::{Document, ElementSpec};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of a job card CSV file. Numeric columns stay as text so that
/// malformed values reach the filter unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCardRecord {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
}

impl JobCardRecord {
    fn to_spec(&self) -> ElementSpec {
        let mut spec = ElementSpec::new("div")
            .class(JOB_CARD_CLASS)
            .data("title", self.title.as_str())
            .text(self.title.as_str());
        // 空欄位不輸出屬性
        for (key, value) in [
            ("category", &self.category),
            ("rate", &self.rate),
            ("distance", &self.distance),
            ("lat", &self.lat),
            ("lng", &self.lng),
        ] {
            if !value.is_empty() {
                spec = spec.data(key, value.as_str());
            }
        }
        spec
    }
}

pub fn load_job_cards<P: AsRef<Path>>(path: P) -> Result<Vec<JobCardRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let mut cards = Vec::new();
    for record in reader.deserialize() {
        cards.push(record?);
    }
    Ok(cards)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldTemplate {
    pub tag: String,
    pub name: String,
    pub required: bool,
    pub value: String,
}

impl FieldTemplate {
    pub fn required(tag: &str, name: &str, value: &str) -> Self {
        Self {
            tag: tag.to_string(),
            name: name.to_string(),
            required: true,
            value: value.to_string(),
        }
    }

    pub fn optional(tag: &str, name: &str, value: &str) -> Self {
        Self {
            required: false,
            ..Self::required(tag, name, value)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormTemplate {
    pub id: String,
    pub fields: Vec<FieldTemplate>,
}

/// Builds a document that honors the marketplace page's element contract.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    map: bool,
    filters: bool,
    keyword_filter: bool,
    profile_form: bool,
    chat: bool,
    star_count: usize,
    cards: Vec<JobCardRecord>,
    forms: Vec<FormTemplate>,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::marketplace()
    }
}

impl PageTemplate {
    /// Every section, five rating stars, no job cards.
    pub fn marketplace() -> Self {
        Self {
            map: true,
            filters: true,
            keyword_filter: true,
            profile_form: true,
            chat: true,
            star_count: 5,
            cards: Vec::new(),
            forms: Vec::new(),
        }
    }

    pub fn without_map(mut self) -> Self {
        self.map = false;
        self
    }

    pub fn without_keyword_filter(mut self) -> Self {
        self.keyword_filter = false;
        self
    }

    pub fn without_profile_form(mut self) -> Self {
        self.profile_form = false;
        self
    }

    pub fn with_star_count(mut self, stars: usize) -> Self {
        self.star_count = stars;
        self
    }

    pub fn with_job_cards(mut self, cards: Vec<JobCardRecord>) -> Self {
        self.cards = cards;
        self
    }

    pub fn with_form(mut self, form: FormTemplate) -> Self {
        self.forms.push(form);
        self
    }

    pub fn build(&self) -> Result<Document> {
        let mut doc = Document::new();
        let body = doc.body();

        if self.map {
            doc.append_new(body, ElementSpec::new("div").id(MAP_ID))?;
        }

        if self.filters {
            let filters = doc.append_new(body, ElementSpec::new("div").class("filters"))?;
            doc.append_new(
                filters,
                ElementSpec::new("select")
                    .id(CATEGORY_FILTER_ID)
                    .class(FILTER_INPUT_CLASS),
            )?;
            doc.append_new(
                filters,
                ElementSpec::new("input")
                    .id(MIN_RATE_FILTER_ID)
                    .class(FILTER_INPUT_CLASS)
                    .attr("type", "number"),
            )?;
            doc.append_new(
                filters,
                ElementSpec::new("input")
                    .id(MAX_DISTANCE_FILTER_ID)
                    .class(FILTER_INPUT_CLASS)
                    .attr("type", "number"),
            )?;
            if self.keyword_filter {
                doc.append_new(
                    filters,
                    ElementSpec::new("input")
                        .id(KEYWORD_FILTER_ID)
                        .class(FILTER_INPUT_CLASS)
                        .attr("type", "search"),
                )?;
            }
        }

        let list = doc.append_new(body, ElementSpec::new("div").class("job-list"))?;
        for card in &self.cards {
            doc.append_new(list, card.to_spec())?;
        }

        if self.profile_form {
            let form = doc.append_new(body, ElementSpec::new("form").id("profile-form"))?;
            doc.append_new(form, ElementSpec::new("div").id(SERVICES_CONTAINER_ID))?;
            doc.append_new(
                form,
                ElementSpec::new("input")
                    .attr("type", "file")
                    .attr("name", "profile_picture")
                    .attr("accept", "image/*"),
            )?;
            doc.append_new(form, ElementSpec::new("img").id(IMAGE_PREVIEW_ID))?;
            doc.append_new(
                form,
                ElementSpec::new("input")
                    .id(RATING_VALUE_ID)
                    .attr("type", "hidden")
                    .value("0"),
            )?;
            let stars = doc.append_new(form, ElementSpec::new("div").class("rating"))?;
            for i in 0..self.star_count {
                doc.append_new(
                    stars,
                    ElementSpec::new("span")
                        .class(STAR_CLASS)
                        .data("value", (i + 1).to_string())
                        .text("★"),
                )?;
            }
        }

        for form in &self.forms {
            let node = doc.append_new(body, ElementSpec::new("form").id(&form.id))?;
            for field in &form.fields {
                let mut spec = ElementSpec::new(&field.tag)
                    .attr("name", field.name.as_str())
                    .value(field.value.as_str());
                if field.required {
                    spec = spec.required();
                }
                doc.append_new(node, spec)?;
            }
        }

        if self.chat {
            doc.append_new(body, ElementSpec::new("div").class(CHAT_MESSAGES_CLASS))?;
        }

        Ok(doc)
    }
}
