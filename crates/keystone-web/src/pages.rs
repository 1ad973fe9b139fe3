//! Marketing page handlers
//!
//! The pages are a handful of static renders around one shared layout;
//! anything fancier than string templates would be overkill here.

use axum::response::Html;

struct TeamMember {
    name: &'static str,
    title: &'static str,
    initials: &'static str,
}

const TEAM: &[TeamMember] = &[
    TeamMember {
        name: "Margaret Keller",
        title: "CEO",
        initials: "MK",
    },
    TeamMember {
        name: "Carlos Reyes",
        title: "President",
        initials: "CR",
    },
    TeamMember {
        name: "Sofia Lindgren",
        title: "COO",
        initials: "SL",
    },
    TeamMember {
        name: "Aisha Rahman",
        title: "CFO",
        initials: "AR",
    },
];

pub async fn home() -> Html<String> {
    Html(render_page(
        "Keystone Properties",
        "<h1>Keystone Properties</h1>\
         <p class=\"tagline\">Your partner in real estate investments and short-term rentals.</p>\
         <p>We acquire, renovate and manage residential properties, and we run a portfolio of \
         short-term rentals for owners who would rather not.</p>",
    ))
}

pub async fn team() -> Html<String> {
    let mut cards = String::new();
    for member in TEAM {
        cards.push_str(&format!(
            "<div class=\"card\"><span class=\"avatar\">{}</span>\
             <h3>{}</h3><p>{}</p></div>",
            member.initials, member.name, member.title
        ));
    }
    Html(render_page(
        "Our Team",
        &format!("<h1>Our Team</h1><div class=\"team\">{}</div>", cards),
    ))
}

pub async fn story() -> Html<String> {
    Html(render_page(
        "Our Story",
        "<h1>Our Story</h1>\
         <p>Keystone started with a single duplex and a conviction that property management \
         could be done with more care. Today we manage investments and rentals across the \
         region for a growing group of owners.</p>",
    ))
}

pub async fn contact() -> Html<String> {
    Html(render_contact(&[]))
}

/// Render the contact page, optionally with validation errors above the form.
pub fn render_contact(errors: &[String]) -> String {
    let mut body = String::from("<h1>Contact Us</h1>");
    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">");
        for error in errors {
            body.push_str(&format!("<li>{}</li>", error));
        }
        body.push_str("</ul>");
    }
    body.push_str(
        "<form method=\"post\" action=\"/contact\">\
         <input name=\"name\" placeholder=\"Your Full Name *\" required>\
         <input name=\"email\" type=\"email\" placeholder=\"Your Email Address *\" required>\
         <input name=\"phone\" placeholder=\"Your Phone Number (Optional)\">\
         <input name=\"subject\" placeholder=\"Subject *\" required>\
         <textarea name=\"message\" rows=\"6\" placeholder=\"Your Message *\" required></textarea>\
         <button type=\"submit\">Send Message</button>\
         </form>",
    );
    render_page("Contact Us", &body)
}

pub fn render_contact_thanks() -> String {
    render_page(
        "Thank You",
        "<h1>Thank you!</h1>\
         <p>Your message has been received. We will get back to you shortly.</p>",
    )
}

fn render_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html lang=\"en\">\
         <head>\
         <meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{} - Keystone Properties</title>\
         </head>\
         <body>\
         <nav><a href=\"/\">Home</a> <a href=\"/team\">Team</a> \
         <a href=\"/story\">Our Story</a> <a href=\"/contact\">Contact</a></nav>\
         <main>{}</main>\
         <footer>&copy; Keystone Properties</footer>\
         </body>\
         </html>",
        title, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_page_lists_errors() {
        let page = render_contact(&["Please enter a valid email address.".to_string()]);
        assert!(page.contains("class=\"errors\""));
        assert!(page.contains("Please enter a valid email address."));
    }

    #[test]
    fn test_contact_page_without_errors() {
        let page = render_contact(&[]);
        assert!(!page.contains("class=\"errors\""));
        assert!(page.contains("<form method=\"post\""));
    }
}
