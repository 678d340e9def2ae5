// src/views.rs

use std::fmt::Write;

use chrono::{TimeZone, Utc};
use mongodb::bson::DateTime;
use plant_tracker_api::Flash;

use crate::db::models::{Plant, User};

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_date(date: DateTime) -> String {
    Utc.timestamp_millis_opt(date.timestamp_millis())
        .single()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn flashes(messages: &[Flash]) -> String {
    messages.iter().fold(String::new(), |mut out, flash| {
        let _ = writeln!(
            out,
            "<p class=\"flash {}\">{}</p>",
            flash.kind.as_str(),
            escape_html(&flash.message)
        );
        out
    })
}

fn plant_form(plant: &Plant) -> String {
    let mut form = format!(
        "<li>\n<form method=\"post\" action=\"/plants\">\n\
         <input type=\"hidden\" name=\"id\" value=\"{}\">\n\
         <input name=\"type\" value=\"{}\">\n\
         <input name=\"description\" value=\"{}\">\n\
         <button type=\"submit\">Save</button>\n</form>\n\
         <small>since {}",
        plant.id.to_hex(),
        escape_html(&plant.plant_type),
        escape_html(&plant.description),
        format_date(plant.created_at),
    );
    if !plant.waterings.is_empty() {
        let _ = write!(form, ", watered {} times", plant.waterings.len());
    }
    if let Some(died_at) = plant.died_at {
        let _ = write!(form, ", died {}", format_date(died_at));
    } else if let Some(withered_at) = plant.withered_at {
        let _ = write!(form, ", withered {}", format_date(withered_at));
    }
    form.push_str("</small>\n</li>\n");
    form
}

const NEW_PLANT_FORM: &str = "<form method=\"post\" action=\"/plants\">\n\
     <input name=\"type\" placeholder=\"type\">\n\
     <input name=\"description\" placeholder=\"description\">\n\
     <button type=\"submit\">Add plant</button>\n</form>\n";

/// Home page: the user's plants, or an invitation to sign in.
pub fn render_index(user: Option<&User>, messages: &[Flash]) -> String {
    let mut body = flashes(messages);

    match user {
        Some(user) => {
            let name = if user.display_name.is_empty() {
                &user.username
            } else {
                &user.display_name
            };
            let _ = writeln!(
                body,
                "<header>\n<img src=\"{}\" alt=\"\">\n<h1>{}</h1>\n<a href=\"/logout\">Sign out</a>\n</header>",
                escape_html(&user.avatar_url),
                escape_html(name),
            );
            body.push_str("<ul class=\"plants\">\n");
            for plant in &user.plants {
                body.push_str(&plant_form(plant));
            }
            body.push_str("</ul>\n");
            body.push_str(NEW_PLANT_FORM);
        }
        None => {
            body.push_str("<h1>Plant tracker</h1>\n");
            body.push_str("<a href=\"/auth/twitter\">Sign in with Twitter</a>\n");
        }
    }

    layout("Plant tracker", &body)
}

pub fn render_login(messages: &[Flash]) -> String {
    let mut body = flashes(messages);
    body.push_str("<h1>Sign in</h1>\n<a href=\"/auth/twitter\">Sign in with Twitter</a>\n");
    layout("Sign in", &body)
}
