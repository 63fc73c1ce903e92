use database::model::person::Person;

use crate::{
    form::{
        csrf::CSRF_TOKEN_NAME,
        validator::{FormErrors, ValidationError},
    },
    token::codec::TokenCodec,
};

/// Everything the add page shows: the submitted values, their errors and the CSRF token to embed
pub struct AddFormView<'a> {
    pub jmeno: &'a str,
    pub prijmeni: &'a str,
    pub errors: &'a FormErrors,
    pub csrf_token: Option<&'a str>,
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }

    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="cs">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

/// List page, every row links to its own delete token
pub fn render_index(people: &[Person], tokens: &TokenCodec) -> String {
    let mut body = String::from("    <h1>Uživatelé</h1>\n    <ul class=\"people\">\n");

    for person in people {
        body.push_str(&format!(
            "        <li>{} {} <a href=\"/delete/{}\">Smazat</a></li>\n",
            escape(&person.first_name),
            escape(&person.last_name),
            escape(&tokens.encode(person.id)),
        ));
    }

    body.push_str("    </ul>\n    <a href=\"/add\">Přidat uživatele</a>");

    layout("Uživatelé", &body)
}

fn render_errors(body: &mut String, errors: &[ValidationError]) {
    if errors.is_empty() {
        return;
    }

    body.push_str("        <ul class=\"errors\">\n");
    for error in errors {
        body.push_str(&format!("            <li>{}</li>\n", escape(&error.to_string())));
    }
    body.push_str("        </ul>\n");
}

fn render_field(body: &mut String, name: &str, label: &str, value: &str, errors: &[ValidationError]) {
    body.push_str(&format!(
        "        <p>\n            <label for=\"{name}\">{label}</label>\n            <input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\">\n        </p>\n",
        name = name,
        label = escape(label),
        value = escape(value),
    ));

    render_errors(body, errors);
}

/// Add page, shows the submitted values back alongside their errors
pub fn render_add(view: &AddFormView) -> String {
    let mut body = String::from("    <h1>Přidat uživatele</h1>\n");

    if !view.errors.form.is_empty() {
        body.push_str("    <ul class=\"errors\">\n");
        for error in &view.errors.form {
            body.push_str(&format!("        <li>{}</li>\n", escape(error)));
        }
        body.push_str("    </ul>\n");
    }

    body.push_str("    <form method=\"post\" action=\"/add\">\n");

    if let Some(csrf_token) = view.csrf_token {
        body.push_str(&format!(
            "        <input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
            CSRF_TOKEN_NAME,
            escape(csrf_token)
        ));
    }

    render_field(&mut body, "jmeno", "Jméno", view.jmeno, &view.errors.jmeno);
    render_field(
        &mut body,
        "prijmeni",
        "Příjmení",
        view.prijmeni,
        &view.errors.prijmeni,
    );

    body.push_str(
        "        <input type=\"submit\" value=\"Submit\">\n    </form>\n    <a href=\"/\">Zpět na seznam</a>",
    );

    layout("Přidat uživatele", &body)
}
