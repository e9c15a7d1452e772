//! Plain-text email bodies.

use crate::intake::validation::NewSignup;
use crate::models::signup::SignupKind;
use crate::notify::Email;

pub fn waitlist_confirmation(signup: &NewSignup) -> Email {
    let greeting = greeting(signup.name.as_deref());
    Email {
        to: signup.email.clone(),
        subject: "You're on the Gatehouse waitlist".to_string(),
        text: format!(
            "{greeting}\n\n\
             Thanks for joining the Gatehouse waitlist. We're onboarding teams in small \
             batches and will email you as soon as a spot opens up.\n\n\
             In the meantime, the agent permission primer is a quick read:\n\
             https://gatehouse.dev/docs/primer.pdf\n\n\
             The Gatehouse team\n"
        ),
        reply_to: None,
    }
}

pub fn application_confirmation(signup: &NewSignup) -> Email {
    let greeting = greeting(signup.name.as_deref());
    Email {
        to: signup.email.clone(),
        subject: "We received your design-partner application".to_string(),
        text: format!(
            "{greeting}\n\n\
             Thanks for applying to the Gatehouse design-partner program. Someone from the \
             team will read your application and reply within a few business days.\n\n\
             The whitepaper covers the permit model in more depth:\n\
             https://gatehouse.dev/docs/whitepaper.pdf\n\n\
             The Gatehouse team\n"
        ),
        reply_to: None,
    }
}

pub fn team_notification(signup: &NewSignup, inbox: &str) -> Email {
    let kind = match signup.kind {
        SignupKind::Waitlist => "waitlist signup",
        SignupKind::Application => "design-partner application",
    };
    let field = |label: &str, value: &Option<String>| {
        format!("{label}: {}\n", value.as_deref().unwrap_or("-"))
    };

    let mut text = format!("New {kind}\n\nEmail: {}\n", signup.email);
    text.push_str(&field("Name", &signup.name));
    text.push_str(&field("Company", &signup.company));
    text.push_str(&field("Role", &signup.role));
    if signup.kind == SignupKind::Application {
        text.push_str(&field("Team size", &signup.team_size));
        text.push_str(&field("Use case", &signup.use_case));
        text.push_str(&format!(
            "\nMessage:\n{}\n",
            signup.message.as_deref().unwrap_or("-")
        ));
    }

    Email {
        to: inbox.to_string(),
        subject: format!("[site] New {kind}: {}", signup.email),
        text,
        reply_to: Some(signup.email.clone()),
    }
}

fn greeting(name: Option<&str>) -> String {
    match name.and_then(|n| n.split_whitespace().next()) {
        Some(first) => format!("Hi {first},"),
        None => "Hi there,".to_string(),
    }
}
