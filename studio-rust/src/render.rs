//! Plain-text views of studio data for the terminal.

use crate::{
    history::HistorySummary, AdCopy, EmailCopy, FunnelTemplate, GeneratedFunnel, LandingPageCopy,
};
use std::fmt::Write;

/// Copy-ready text for one email.
pub fn email_text(email: &EmailCopy) -> String {
    format!("Subject: {}\n\n{}", email.subject, email.body)
}

/// Copy-ready text for one ad.
pub fn ad_text(ad: &AdCopy) -> String {
    format!(
        "Headline: {}\n\n{}\n\n{}",
        ad.headline, ad.primary_text, ad.description
    )
}

pub fn landing_page_text(page: &LandingPageCopy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", page.headline);
    let _ = writeln!(out, "{}", page.subheadline);
    let _ = writeln!(out, "[ {} ]", page.hero_button);
    for feature in &page.features {
        let _ = writeln!(out, "  * {feature}");
    }
    for testimonial in &page.testimonials {
        let _ = writeln!(out, "  \"{testimonial}\"");
    }
    let _ = write!(out, "CTA: {}", page.cta);
    out
}

pub fn funnel_text(funnel: &GeneratedFunnel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} ({}, {}) ==",
        funnel.input.product_name,
        funnel.input.language.display_name(),
        funnel.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "\n-- Strategy --\n{}", funnel.strategy_summary);
    let _ = writeln!(out, "\n-- Landing page --\n{}", landing_page_text(&funnel.landing_page));

    let _ = writeln!(out, "\n-- Emails --");
    for email in &funnel.emails {
        let _ = writeln!(out, "[{}]\n{}\n", email.kind.as_str(), email_text(email));
    }

    let _ = writeln!(out, "-- Ads --");
    for ad in &funnel.ads {
        let _ = writeln!(out, "[{}]\n{}\n", ad.platform, ad_text(ad));
    }
    out.trim_end().to_string()
}

pub fn history_row(summary: &HistorySummary) -> String {
    format!(
        "{}  {}  {}  {}",
        summary.id,
        summary.created_on,
        summary.language.as_str(),
        summary.product_name
    )
}

pub fn template_row(template: &FunnelTemplate) -> String {
    format!(
        "{}  {}  ({}, {})  {}",
        template.id,
        template.name,
        template.data.tone,
        template.data.language,
        template.description
    )
}

pub fn template_text(template: &FunnelTemplate) -> String {
    let data = &template.data;
    format!(
        "id: {}\nname: {}\ndescription: {}\nproduct: {}\naudience: {}\npain points: {}\nbenefits: \
         {}\ntone: {}\nlanguage: {}",
        template.id,
        template.name,
        template.description,
        data.product_name,
        data.target_audience,
        data.pain_points,
        data.benefits,
        data.tone,
        data.language
    )
}
