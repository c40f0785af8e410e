use crate::domain::document::{Document, ElementSpec, NodeId};
use crate::utils::error::{PageError, Result};

pub const SERVICES_CONTAINER_ID: &str = "services-container";
pub const INVALID_CLASS: &str = "invalid";

const FIELD_TAGS: [&str; 3] = ["input", "select", "textarea"];

/// Checks every required field of the form with id `form_id`.
pub fn validate_form(doc: &mut Document, form_id: &str) -> Result<bool> {
    let form = doc.require_by_id(form_id)?;
    validate_form_element(doc, form)
}

/// Marks empty required fields (after trimming) with the `invalid` class and
/// clears the mark on the others. Returns true iff none was empty.
pub fn validate_form_element(doc: &mut Document, form: NodeId) -> Result<bool> {
    let mut is_valid = true;

    for node in doc.descendants(form)? {
        let element = doc.element_mut(node)?;
        if !FIELD_TAGS.contains(&element.tag()) || !element.is_required() {
            continue;
        }

        if element.value().trim().is_empty() {
            element.add_class(INVALID_CLASS);
            is_valid = false;
        } else {
            element.remove_class(INVALID_CLASS);
        }
    }

    tracing::debug!("Form {} validated: {}", form.index(), is_valid);
    Ok(is_valid)
}

/// Builds the repeated "service + hourly rate" rows of the profile form.
///
/// Row suffixes come from a counter that only grows, so removing rows out of
/// order never yields two rows with the same field names.
#[derive(Debug, Clone)]
pub struct ServiceFieldBuilder {
    next_index: Option<usize>,
    categories: Vec<String>,
}

/// The controls of one service row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRow {
    pub row: NodeId,
    pub select: NodeId,
    pub rate: NodeId,
    pub remove_button: NodeId,
    pub index: usize,
}

impl ServiceFieldBuilder {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            next_index: None,
            categories,
        }
    }

    pub fn add_service_field(&mut self, doc: &mut Document) -> Result<ServiceRow> {
        let container = doc.require_by_id(SERVICES_CONTAINER_ID)?;
        // 第一次使用時以現有列數為起點，之後只遞增
        let index = match self.next_index {
            Some(i) => i,
            None => doc.children(container)?.len(),
        };
        self.next_index = Some(index + 1);

        let row = doc.create(ElementSpec::new("div").class("service-field"));
        let select = doc.append_new(
            row,
            ElementSpec::new("select")
                .attr("name", format!("service-{}", index))
                .required(),
        )?;
        doc.append_new(
            select,
            ElementSpec::new("option")
                .attr("value", "")
                .text("Select Service"),
        )?;
        for category in &self.categories {
            doc.append_new(
                select,
                ElementSpec::new("option")
                    .attr("value", category.as_str())
                    .text(category.as_str()),
            )?;
        }
        let rate = doc.append_new(
            row,
            ElementSpec::new("input")
                .attr("type", "number")
                .attr("name", format!("rate-{}", index))
                .attr("placeholder", "Hourly Rate")
                .required(),
        )?;
        let remove_button = doc.append_new(
            row,
            ElementSpec::new("button")
                .attr("type", "button")
                .text("Remove"),
        )?;
        doc.append_child(container, row)?;

        Ok(ServiceRow {
            row,
            select,
            rate,
            remove_button,
            index,
        })
    }
}

/// Detaches the row that contains `control`.
pub fn remove_service_field(doc: &mut Document, control: NodeId) -> Result<()> {
    let row = doc.parent(control)?.ok_or_else(|| PageError::DocumentError {
        message: format!("node {} has no parent row", control.index()),
    })?;
    doc.remove(row)
}
