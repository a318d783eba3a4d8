//! Page Contexts & Templates
//!
//! Generic table, detail and form contexts built by the views, and the
//! askama templates that render them.

use crate::dashboard::messages::{Message, Messages};
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

// =============================================================================
// Tables
// =============================================================================

/// One table cell, optionally linking to a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub link: String,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: String::new(),
        }
    }

    pub fn link(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: link.into(),
        }
    }

    pub fn opt(text: Option<&str>) -> Self {
        Self::text(text.unwrap_or("-"))
    }
}

/// A button or link acting on a row, a table, or a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub url: String,
    /// Submitted as a POST form instead of followed as a link
    pub post: bool,
    pub danger: bool,
}

impl Action {
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            post: false,
            danger: false,
        }
    }

    pub fn post(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            post: true,
            danger: false,
        }
    }

    pub fn delete(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            danger: true,
            ..Self::post(label, url)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub slug: String,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub actions: Vec<Action>,
    pub empty_text: String,
}

impl Table {
    pub fn new(slug: &str, title: &str, columns: &[&str]) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            actions: Vec::new(),
            empty_text: "No items to display.".to_string(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn push(&mut self, cells: Vec<Cell>, actions: Vec<Action>) {
        self.rows.push(Row { cells, actions });
    }
}

// =============================================================================
// Detail Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub fields: Vec<Field>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, label: &str, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            label: label.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn opt(self, label: &str, value: Option<&str>) -> Self {
        self.field(label, value.unwrap_or("-"))
    }
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A rendered form input with its current value and error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    /// One of `text`, `number`, `password`, `textarea`, `select`, `checkbox`
    pub kind: &'static str,
    pub value: String,
    pub choices: Vec<Choice>,
    pub required: bool,
    pub error: String,
}

impl FormField {
    fn new(name: &str, label: &str, kind: &'static str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            value: value.to_string(),
            choices: Vec::new(),
            required: true,
            error: String::new(),
        }
    }

    pub fn text(name: &str, label: &str, value: &str) -> Self {
        Self::new(name, label, "text", value)
    }

    pub fn number(name: &str, label: &str, value: &str) -> Self {
        Self::new(name, label, "number", value)
    }

    pub fn password(name: &str, label: &str) -> Self {
        Self::new(name, label, "password", "")
    }

    pub fn textarea(name: &str, label: &str, value: &str) -> Self {
        Self::new(name, label, "textarea", value)
    }

    pub fn checkbox(name: &str, label: &str, checked: bool) -> Self {
        Self {
            required: false,
            ..Self::new(name, label, "checkbox", if checked { "on" } else { "" })
        }
    }

    /// Select input; the blank choice is prepended when not required
    pub fn select(name: &str, label: &str, value: &str, choices: Vec<(String, String)>) -> Self {
        let mut field = Self::new(name, label, "select", value);
        field.choices = choices
            .into_iter()
            .map(|(v, l)| Choice {
                selected: v == value,
                value: v,
                label: l,
            })
            .collect();
        field
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        if self.kind == "select" {
            self.choices.insert(
                0,
                Choice {
                    value: String::new(),
                    label: String::new(),
                    selected: self.value.is_empty(),
                },
            );
        }
        self
    }

    pub fn is_checked(&self) -> bool {
        !self.value.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    pub action: String,
    pub submit_label: String,
    pub cancel_url: String,
    pub fields: Vec<FormField>,
    pub non_field_errors: Vec<String>,
}

impl FormView {
    pub fn new(action: impl Into<String>, submit_label: &str, cancel_url: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            submit_label: submit_label.to_string(),
            cancel_url: cancel_url.into(),
            fields: Vec::new(),
            non_field_errors: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FormField>) -> Self {
        self.fields = fields;
        self
    }

    /// Attach an error to the named field, or to the form when unknown
    pub fn set_error(&mut self, field: Option<&str>, message: &str) {
        match field.and_then(|name| self.fields.iter_mut().find(|f| f.name == name)) {
            Some(f) => f.error = message.to_string(),
            None => self.non_field_errors.push(message.to_string()),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.non_field_errors.is_empty() || self.fields.iter().any(|f| !f.error.is_empty())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A tab of the index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLink {
    pub slug: String,
    pub label: String,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub messages: Vec<Message>,
    pub tabs: Vec<TabLink>,
    pub table: Table,
}

#[derive(Template)]
#[template(path = "detail.html")]
pub struct DetailTemplate {
    pub title: String,
    pub messages: Vec<Message>,
    pub back_url: String,
    pub sections: Vec<Section>,
    pub tables: Vec<Table>,
    pub actions: Vec<Action>,
    pub forms: Vec<FormView>,
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub title: String,
    pub messages: Vec<Message>,
    pub form: FormView,
}

impl FormTemplate {
    pub fn new(title: impl Into<String>, messages: &Messages, form: FormView) -> Self {
        Self {
            title: title.into(),
            messages: messages.iter().cloned().collect(),
            form,
        }
    }
}

/// Render an askama template as an HTML response
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template. Error: {}", err),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_marks_selected() {
        let field = FormField::select(
            "proto",
            "Share Protocol",
            "CIFS",
            vec![("NFS".into(), "NFS".into()), ("CIFS".into(), "CIFS".into())],
        );
        assert!(!field.choices[0].selected);
        assert!(field.choices[1].selected);

        let field = field.optional();
        assert_eq!(field.choices.len(), 3);
        assert_eq!(field.choices[0].value, "");
    }

    #[test]
    fn test_form_errors() {
        let mut form = FormView::new("/create/share", "Create", "/")
            .with_fields(vec![FormField::text("name", "Name", "demo")]);
        assert!(!form.has_errors());

        form.set_error(Some("name"), "This field is required.");
        form.set_error(Some("missing"), "Unknown field error.");
        assert_eq!(form.fields[0].error, "This field is required.");
        assert_eq!(form.non_field_errors, vec!["Unknown field error.".to_string()]);
        assert!(form.has_errors());
    }

    #[test]
    fn test_render_form_escapes_values() {
        let form = FormView::new("/create/share", "Create", "/").with_fields(vec![
            FormField::text("name", "Name", "<script>"),
            FormField::checkbox("force", "Force", true),
        ]);
        let html = FormTemplate::new("Create Share", &Messages::new(), form)
            .render()
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_render_index_table() {
        let mut table = Table::new("shares", "Shares", &["Name", "Size"]);
        table.push(
            vec![Cell::link("demo", "/shares/s1"), Cell::text("1 GiB")],
            vec![Action::delete("Delete Share", "/shares/s1/delete")],
        );
        let html = IndexTemplate {
            title: "Shares".into(),
            messages: vec![],
            tabs: vec![TabLink {
                slug: "shares".into(),
                label: "Shares".into(),
                active: true,
            }],
            table,
        }
        .render()
        .unwrap();
        assert!(html.contains(">demo</a>"));
        assert!(html.contains("Delete Share"));
        assert!(html.contains("1 GiB"));
    }
}
