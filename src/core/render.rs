//! Markup for the services grid and the per-service pages.
//!
//! Output is plain HTML with stable class names; styling lives elsewhere.
//! Every piece of record text goes through [`escape_html`]; image URLs
//! additionally go through [`escape_css_url`] before landing in a `style`.
//!
//! Services whose slug is not path-safe get no detail page, so they are
//! listed without a link.

use crate::core::directory::find_by_slug;
use crate::core::ResolvedService;
use crate::utils::validation::is_safe_slug;
use std::fmt::Write;

pub const DETAIL_SUBTITLE: &str = "Professional solutions tailored to your business goals.";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn service_href(slug: &str) -> String {
    format!("/services/{}", slug)
}

/// Percent-encodes everything that could close a quoted CSS `url()`.
pub fn escape_css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        if matches!(c, '\'' | '"' | '(' | ')' | '\\') || c.is_whitespace() || c.is_control() {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{:02X}", byte);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn background_style(image_url: &str) -> String {
    format!(
        "background-image: url('{}')",
        escape_html(&escape_css_url(image_url))
    )
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// The homepage services section, one card per service.
pub fn render_services_grid(services: &[ResolvedService]) -> String {
    let mut html = String::from(
        "<section class=\"services\">\n<div class=\"container\">\n<div class=\"grid\">\n",
    );

    for resolved in services {
        let service = &resolved.service;
        let linked = is_safe_slug(&service.slug);
        if linked {
            let _ = writeln!(
                html,
                "<a class=\"card-link\" href=\"{}\">",
                escape_html(&service_href(&service.slug))
            );
        }
        let _ = write!(
            html,
            "<div class=\"card\">\n<div class=\"card-image\" style=\"{}\"></div>\n",
            background_style(&resolved.image_url)
        );
        if service.is_exclusive {
            html.push_str("<span class=\"badge\">EXCLUSIVE</span>\n");
        }
        let _ = write!(
            html,
            "<h3 class=\"title\">{}</h3>\n<p class=\"description\">{}</p>\n",
            escape_html(&service.title),
            escape_html(&service.short_description)
        );
        if linked {
            html.push_str("<span class=\"read-more\">Read More →</span>\n</div>\n</a>\n");
        } else {
            html.push_str("</div>\n");
        }
    }

    html.push_str("</div>\n</div>\n</section>\n");
    html
}

pub fn render_home_page(site_name: &str, services: &[ResolvedService]) -> String {
    let body = format!("<main>\n{}</main>\n", render_services_grid(services));
    document(site_name, &body)
}

/// Detail page for `slug`, or `None` when no service carries it.
pub fn render_service_detail(
    site_name: &str,
    services: &[ResolvedService],
    slug: &str,
) -> Option<String> {
    let current = find_by_slug(services, slug)?;
    let service = &current.service;

    let mut body = String::from("<main>\n");
    let _ = write!(
        body,
        "<header class=\"page-header\">\n<h1>{}</h1>\n<p>{}</p>\n</header>\n",
        escape_html(&service.title),
        DETAIL_SUBTITLE
    );

    body.push_str("<div class=\"container\">\n<div class=\"layout\">\n<div class=\"content\">\n");
    let _ = write!(
        body,
        "<div class=\"image-placeholder\" style=\"{}; background-size: cover; background-position: center\"></div>\n",
        background_style(&current.image_url)
    );
    let _ = write!(
        body,
        "<h2 class=\"section-title\">Overview</h2>\n\
         <p class=\"text\" style=\"white-space: pre-wrap\">{}</p>\n",
        escape_html(&service.full_description)
    );

    body.push_str("<h3 class=\"section-title\">Key Features</h3>\n<div class=\"features-grid\">\n");
    for feature in service.features.iter().flatten() {
        let _ = writeln!(
            body,
            "<div class=\"feature-item\"><span>{}</span></div>",
            escape_html(feature)
        );
    }
    body.push_str("</div>\n</div>\n");

    body.push_str(
        "<aside class=\"sidebar\">\n<div class=\"sidebar-box\">\n\
         <h3 class=\"sidebar-title\">Our Services</h3>\n<ul class=\"service-list\">\n",
    );
    for other in services {
        let class = if other.service.slug == slug {
            "service-link active"
        } else {
            "service-link"
        };
        if is_safe_slug(&other.service.slug) {
            let _ = writeln!(
                body,
                "<li><a class=\"{}\" href=\"{}\">{}</a></li>",
                class,
                escape_html(&service_href(&other.service.slug)),
                escape_html(&other.service.title)
            );
        } else {
            let _ = writeln!(
                body,
                "<li><span class=\"{}\">{}</span></li>",
                class,
                escape_html(&other.service.title)
            );
        }
    }
    body.push_str("</ul>\n</div>\n");
    body.push_str(
        "<div class=\"sidebar-box cta-box\">\n<h3 class=\"sidebar-title\">Need Help?</h3>\n\
         <p>Contact us today to discuss how we can help you achieve your goals.</p>\n\
         <a class=\"cta-btn\" href=\"/contact\">Contact Us</a>\n</div>\n</aside>\n",
    );
    body.push_str("</div>\n</div>\n</main>\n");

    let title = format!("{} | {}", service.title, site_name);
    Some(document(&title, &body))
}

pub fn render_not_found(site_name: &str) -> String {
    let body = "<main>\n<h1>Page not found</h1>\n\
                <p>The service you are looking for does not exist.</p>\n\
                <a href=\"/\">Back to home</a>\n</main>\n";
    document(&format!("Not found | {}", site_name), body)
}
