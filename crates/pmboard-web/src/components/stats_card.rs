//! Stats card for the dashboard

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardColor {
    Default,
    Green,
    Yellow,
    Red,
}

impl CardColor {
    fn to_class(self) -> &'static str {
        match self {
            CardColor::Default => "",
            CardColor::Green => "card-green",
            CardColor::Yellow => "card-yellow",
            CardColor::Red => "card-red",
        }
    }

    /// Colour for a completion percentage
    pub fn for_percent(percent: u32) -> Self {
        match percent {
            75.. => CardColor::Green,
            40..75 => CardColor::Yellow,
            _ => CardColor::Red,
        }
    }
}

/// A single metric with icon and label
#[component]
pub fn StatsCard(
    /// Card label (e.g., "Open Tickets")
    #[prop(into)]
    label: String,
    /// Formatted value
    #[prop(into)]
    value: String,
    #[prop(into)]
    icon: String,
    #[prop(default = CardColor::Default)]
    color: CardColor,
    /// Where the card leads when clicked
    #[prop(optional, into)]
    href: Option<String>,
) -> impl IntoView {
    let color_class = color.to_class();

    let body = view! {
        <div class="stats-card-icon">{icon}</div>
        <div class="stats-card-content">
            <div class="stats-card-label">{label}</div>
            <div class="stats-card-value">{value}</div>
        </div>
    };

    match href {
        Some(href) => view! {
            <a class=format!("card stats-card stats-card-clickable {}", color_class) href=href>
                {body}
                <div class="stats-card-action-hint">"Open →"</div>
            </a>
        }
        .into_any(),
        None => view! { <div class=format!("card stats-card {}", color_class)>{body}</div> }.into_any(),
    }
}
