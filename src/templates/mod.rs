//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary; the site has no theme directory.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::Labels;

const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="{{ labels.html_lang }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{{ site.title }}{% endblock title %}</title>
</head>
<body>
  <header class="header"><a href="/"><img src="/logo.png" alt="logo"></a></header>
  {% block content %}{% endblock content %}
</body>
</html>
"#;

const INDEX: &str = r#"{% extends "layout.html" %}
{% block content %}
<main class="posts">
  {% for post in posts %}
  <a class="post" href="{{ post.path | safe }}">
    <strong class="title">{{ post.title }}</strong>
    <p class="subtitle">{{ post.subtitle | truncate_chars(length=160) }}</p>
    <div class="infos">
      <time{% if post.datetime %} datetime="{{ post.datetime | safe }}"{% endif %}>{{ post.date }}</time>
      <span class="author">{{ post.author }}</span>
    </div>
  </a>
  {% endfor %}
  {% if next_link %}
  <a class="load-more" href="{{ next_link | safe }}">{{ labels.load_more }}</a>
  {% endif %}
</main>
{% endblock content %}
"#;

const POST: &str = r#"{% extends "layout.html" %}
{% block title %}{{ site.title }} | {{ post.title }}{% endblock title %}
{% block content %}
{% if post.banner_url %}<div class="banner"><img src="{{ post.banner_url | safe }}" alt=""></div>{% endif %}
<main class="post">
  <h1 class="title">{{ post.title }}</h1>
  <div class="infos">
    <time{% if post.datetime %} datetime="{{ post.datetime | safe }}"{% endif %}>{{ post.date }}</time>
    <span class="author">{{ post.author }}</span>
    <span class="read-time">{{ post.read_time }} {{ labels.minutes }}</span>
  </div>
  <div class="content">
    {% for block in post.blocks %}
    <section>
      <h2 class="heading">{{ block.heading }}</h2>
      <div class="body">{{ block.html | safe }}</div>
    </section>
    {% endfor %}
  </div>
</main>
{% endblock content %}
"#;

const NOT_FOUND: &str = r#"{% extends "layout.html" %}
{% block content %}
<main class="not-found">
  <h1>{{ labels.not_found }}</h1>
  <a href="/">{{ labels.back_home }}</a>
</main>
{% endblock content %}
"#;

const UPSTREAM_ERROR: &str = r#"{% extends "layout.html" %}
{% block content %}
<main class="upstream-error">
  <h1>{{ labels.upstream_error }}</h1>
  <a href="{{ retry_path | safe }}">{{ labels.retry }}</a>
</main>
{% endblock content %}
"#;

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", LAYOUT),
            ("index.html", INDEX),
            ("post.html", POST),
            ("404.html", NOT_FOUND),
            ("upstream_error.html", UPSTREAM_ERROR),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}...", truncated.trim_end())))
    }
}

// Data structures for template context. Values marked `| safe` in the
// templates (paths, URLs) must be escaped by whoever builds them.

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummaryData {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: String,
    pub title: String,
    pub author: String,
    pub banner_url: String,
    pub date: String,
    pub datetime: Option<String>,
    pub read_time: u32,
    pub blocks: Vec<BlockData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    pub html: String,
}

/// Base context shared by every page
pub fn base_context(site: &SiteData, labels: &Labels) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("labels", labels);
    context
}
