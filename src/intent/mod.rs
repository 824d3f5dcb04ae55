//! Intent rules and command dispatch
//!
//! A fixed, ordered rule list tried top-to-bottom with first-match-wins
//! semantics; two parameterized search rules run ahead of it, and
//! anything unmatched becomes a prompt for the local model.

mod actions;

pub use actions::{Actions, MediaControl, MediaTap, SystemLauncher, UrlLauncher};

use regex::Regex;

use crate::llm::LocalLlm;
use crate::{Error, Result};

/// What the main loop should do after one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Keep listening
    Continue,
    /// The quit intent fired; wind the program down
    Terminate,
}

/// A matched intent's behavior
pub trait Handler {
    /// Run the intent's side effects
    ///
    /// # Errors
    ///
    /// Returns error for failures the main loop should log and absorb
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome>;
}

/// One entry in the fixed rule list
struct IntentRule {
    name: &'static str,
    pattern: Regex,
    handler: Box<dyn Handler>,
}

/// Which engine a parameterized search rule targets
enum SearchKind {
    Youtube,
    Google,
}

/// A trigger phrase that captures trailing free text as the query
struct SearchRule {
    pattern: Regex,
    kind: SearchKind,
}

/// Maps utterances to intent handlers, falling back to the local model
pub struct CommandInterpreter {
    actions: Actions,
    llm: LocalLlm,
    search_rules: Vec<SearchRule>,
    rules: Vec<IntentRule>,
}

impl CommandInterpreter {
    /// Build the rule table
    ///
    /// # Errors
    ///
    /// Returns error if a rule pattern fails to compile
    pub fn new(actions: Actions, llm: LocalLlm) -> Result<Self> {
        let search_rules = vec![
            SearchRule {
                pattern: compile(r"(?:youtube|recherche youtube) (.+)$")?,
                kind: SearchKind::Youtube,
            },
            SearchRule {
                pattern: compile(r"(?:google|recherche google|cherche sur google) (.+)$")?,
                kind: SearchKind::Google,
            },
        ];

        let rules = vec![
            rule(
                "time",
                r"\b(quelle heure|il est quelle heure|heure)\b",
                SpeakTime,
            )?,
            rule("date", r"\b(quelle date|quel jour|date)\b", SpeakDate)?,
            rule(
                "security-on",
                r"\b(active(r)?|lance(r)?) la s[ée]curit[ée]\b|\bsurveillance on\b",
                ArmSecurity,
            )?,
            rule(
                "security-off",
                r"\b(d[ée]sactive(r)?|retire(r)?) la s[ée]curit[ée]\b|\bsurveillance off\b",
                DisarmSecurity,
            )?,
            rule("capture", r"\b(photo|capture|intrus)\b", CaptureNow)?,
            rule(
                "open-browser",
                r"\b(ouvre|lance) (chrome|navigateur)\b",
                OpenBrowser,
            )?,
            rule(
                "open-whatsapp",
                r"\b(ouvre|lance) (whatsapp|whatsapp web)\b",
                OpenWhatsApp,
            )?,
            rule("open-youtube", r"\b(ouvre|va sur) youtube\b", OpenYoutube)?,
            rule(
                "media-play-pause",
                r"\b(pause|reprends|lecture|play)\b",
                MediaPlayPause,
            )?,
            rule(
                "volume-up",
                r"volume \+|\baugmente le volume\b",
                Volume { up: true },
            )?,
            rule(
                "volume-down",
                r"volume -|\bbaisse le volume\b",
                Volume { up: false },
            )?,
            rule("quit", r"\b(quit|quitte|arrête|stop)\b", Quit)?,
        ];

        Ok(Self {
            actions,
            llm,
            search_rules,
            rules,
        })
    }

    /// Dispatch one utterance
    ///
    /// # Errors
    ///
    /// Returns error when a handler fails; the termination signal is the
    /// `Terminate` outcome, never an error
    pub async fn interpret(&self, utterance: &str) -> Result<DispatchOutcome> {
        if utterance.is_empty() {
            return Ok(DispatchOutcome::Continue);
        }

        // Parameterized searches win over everything else
        for search in &self.search_rules {
            if let Some(caps) = search.pattern.captures(utterance) {
                let terms = caps.get(1).map_or("", |m| m.as_str()).trim();
                if !terms.is_empty() {
                    match search.kind {
                        SearchKind::Youtube => self.actions.youtube_search(terms),
                        SearchKind::Google => self.actions.google_search(terms),
                    }
                    return Ok(DispatchOutcome::Continue);
                }
            }
        }

        for rule in &self.rules {
            if rule.pattern.is_match(utterance) {
                tracing::debug!(rule = rule.name, utterance, "intent matched");
                return rule.handler.handle(&self.actions);
            }
        }

        // Nothing matched; let the local model have it
        tracing::debug!(utterance, "no intent matched, deferring to model");
        let reply = self.llm.generate(utterance).await;
        if reply.is_empty() {
            self.actions.speak("Je n'ai pas compris.");
        } else {
            self.actions.speak(reply);
        }
        Ok(DispatchOutcome::Continue)
    }

    /// The capability surface, for callers that need to speak directly
    #[must_use]
    pub const fn actions(&self) -> &Actions {
        &self.actions
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("bad intent pattern: {e}")))
}

fn rule<H: Handler + 'static>(
    name: &'static str,
    pattern: &str,
    handler: H,
) -> Result<IntentRule> {
    Ok(IntentRule {
        name,
        pattern: compile(pattern)?,
        handler: Box::new(handler),
    })
}

struct SpeakTime;

impl Handler for SpeakTime {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.speak_time();
        Ok(DispatchOutcome::Continue)
    }
}

struct SpeakDate;

impl Handler for SpeakDate {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.speak_date();
        Ok(DispatchOutcome::Continue)
    }
}

struct ArmSecurity;

impl Handler for ArmSecurity {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.arm_security();
        Ok(DispatchOutcome::Continue)
    }
}

struct DisarmSecurity;

impl Handler for DisarmSecurity {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.disarm_security();
        Ok(DispatchOutcome::Continue)
    }
}

struct CaptureNow;

impl Handler for CaptureNow {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.capture_now();
        Ok(DispatchOutcome::Continue)
    }
}

struct OpenBrowser;

impl Handler for OpenBrowser {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.open_browser();
        Ok(DispatchOutcome::Continue)
    }
}

struct OpenWhatsApp;

impl Handler for OpenWhatsApp {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.open_whatsapp();
        Ok(DispatchOutcome::Continue)
    }
}

struct OpenYoutube;

impl Handler for OpenYoutube {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.open_youtube();
        Ok(DispatchOutcome::Continue)
    }
}

struct MediaPlayPause;

impl Handler for MediaPlayPause {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.media_play_pause()?;
        Ok(DispatchOutcome::Continue)
    }
}

struct Volume {
    up: bool,
}

impl Handler for Volume {
    fn handle(&self, actions: &Actions) -> Result<DispatchOutcome> {
        actions.media_volume(self.up);
        Ok(DispatchOutcome::Continue)
    }
}

struct Quit;

impl Handler for Quit {
    fn handle(&self, _actions: &Actions) -> Result<DispatchOutcome> {
        Ok(DispatchOutcome::Terminate)
    }
}
