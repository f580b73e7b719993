use minijinja::{context, Environment};
use serde::Serialize;

use crate::chat::EXAMPLE_PROMPTS;
use crate::gemini_client::MODEL_NAME;
use crate::session::{Role, Session, Status, Turn};

const PAGE_TEMPLATE: &str = include_str!("../../templates/page.html");

/// One transcript entry prepared for the template. Assistant turns arrive
/// as markdown (the preamble asks for bullets and tables) and are rendered
/// to HTML here; user turns stay plain text for the template to escape.
#[derive(Debug, Serialize)]
pub struct DisplayTurn {
    role: Role,
    content: String,
}

impl DisplayTurn {
    fn of(turn: &Turn) -> Self {
        let content = match turn.role {
            Role::User => turn.content.clone(),
            Role::Assistant => markdown_to_html(&turn.content),
        };
        Self {
            role: turn.role,
            content,
        }
    }
}

/// GFM rendering with raw HTML disabled, so markup in model output comes
/// out escaped rather than live.
fn markdown_to_html(source: &str) -> String {
    // `to_html_with_options` can only fail on MDX input, which gfm is not.
    markdown::to_html_with_options(source, &markdown::Options::gfm())
        .unwrap_or_else(|_| markdown::to_html(source))
}

/// Everything the page needs from a session, copied out so no lock is held
/// while rendering.
#[derive(Debug)]
pub struct PageSnapshot {
    pub turns: Vec<DisplayTurn>,
    pub busy: bool,
    pub error: Option<String>,
}

impl PageSnapshot {
    pub fn of(session: &Session) -> Self {
        Self {
            turns: session.transcript.turns().iter().map(DisplayTurn::of).collect(),
            busy: session.status == Status::AwaitingResponse,
            error: session.last_error.clone(),
        }
    }
}

/// Compiled template environment, cheap to clone into the router state.
/// Rendering is a pure function of the snapshot: same snapshot, same markup.
#[derive(Clone)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("page.html", PAGE_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render_page(&self, snapshot: &PageSnapshot) -> Result<String, minijinja::Error> {
        let template = self.env.get_template("page.html")?;
        template.render(context! {
            turns => &snapshot.turns,
            busy => snapshot.busy,
            error => &snapshot.error,
            examples => EXAMPLE_PROMPTS,
            model => MODEL_NAME,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(snapshot: &PageSnapshot) -> String {
        Templates::new().unwrap().render_page(snapshot).unwrap()
    }

    fn snapshot_with_round() -> PageSnapshot {
        let mut session = Session::new();
        session.transcript.push_user("What is DPSP?");
        session.transcript.push_assistant("Directive Principles of State Policy.");
        PageSnapshot::of(&session)
    }

    #[test]
    fn renders_turns_in_order_with_role_classes() {
        let html = render(&snapshot_with_round());

        let user = html.find("chat-user").expect("user bubble present");
        let assistant = html.find("chat-ai").expect("assistant bubble present");
        assert!(user < assistant);
        assert!(html.contains("What is DPSP?"));
        assert!(html.contains("Directive Principles of State Policy."));
    }

    #[test]
    fn escapes_html_in_turn_content() {
        let mut session = Session::new();
        session.transcript.push_user("<script>alert(1)</script>");
        let html = render(&PageSnapshot::of(&session));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)"));
    }

    #[test]
    fn assistant_markdown_renders_as_html() {
        let mut session = Session::new();
        session.transcript.push_user("Compare FR vs DPSP");
        session.transcript.push_assistant(
            "**Direct answer**\n\n| FR | DPSP |\n| --- | --- |\n| Justiciable | Non-justiciable |",
        );
        let html = render(&PageSnapshot::of(&session));

        assert!(html.contains("<strong>Direct answer</strong>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>Justiciable</td>"));
    }

    #[test]
    fn raw_html_in_assistant_markdown_stays_inert() {
        let mut session = Session::new();
        session.transcript.push_user("q");
        session
            .transcript
            .push_assistant("before <script>alert(1)</script> after");
        let html = render(&PageSnapshot::of(&session));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn idle_page_has_input_enabled_and_no_busy_bubble() {
        let html = render(&snapshot_with_round());

        assert!(!html.contains("Preparing exam-ready answer"));
        assert!(!html.contains("http-equiv=\"refresh\""));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn busy_page_shows_indicator_and_disables_input() {
        let mut session = Session::new();
        session.transcript.push_user("Pending question");
        session.status = Status::AwaitingResponse;
        let html = render(&PageSnapshot::of(&session));

        assert!(html.contains("Preparing exam-ready answer"));
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(html.contains("disabled"));
    }

    #[test]
    fn error_banner_appears_only_when_set() {
        let mut session = Session::new();
        session.transcript.push_user("Question");
        session.last_error = Some("Gemini API error: 429".to_string());
        let html = render(&PageSnapshot::of(&session));
        assert!(html.contains("Gemini API error: 429"));
        assert!(html.contains("Try again or check model/API key."));

        let html = render(&snapshot_with_round());
        assert!(!html.contains("Try again or check model/API key."));
    }

    #[test]
    fn sidebar_lists_every_example_and_the_model() {
        let html = render(&PageSnapshot::of(&Session::new()));

        for example in EXAMPLE_PROMPTS {
            let escaped = example.replace('&', "&amp;");
            assert!(
                html.contains(&escaped) || html.contains(example),
                "example missing from page: {example}"
            );
        }
        assert!(html.contains(MODEL_NAME));
        assert!(html.contains("Ask your doubt"));
    }
}
