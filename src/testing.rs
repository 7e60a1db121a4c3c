//! Test doubles: a transport with canned replies and a console with
//! scripted answers.

use std::cell::RefCell;
use std::collections::VecDeque;

use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::api::{interpret_response, Method, Request, Transport};
use crate::commands::Session;
use crate::config::MemoryTokenStore;
use crate::error::{Error, Result};
use crate::output::OutputMode;
use crate::ui::{Console, Level};

#[derive(Clone)]
enum Reply {
    Json(Value),
    Status(u16, Value),
}

struct Route {
    method: Method,
    path: String,
    replies: RefCell<VecDeque<Reply>>,
}

/// Replies are consumed in order per route; the last one repeats.
#[derive(Default)]
pub struct FakeTransport {
    routes: Vec<Route>,
    calls: RefCell<Vec<Request>>,
    token: Option<String>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, method: Method, path: &str, reply: Reply) -> Self {
        match self.routes.iter().position(|r| r.method == method && r.path == path) {
            Some(i) => self.routes[i].replies.borrow_mut().push_back(reply),
            None => self.routes.push(Route {
                method,
                path: path.to_string(),
                replies: RefCell::new(VecDeque::from([reply])),
            }),
        }
        self
    }

    pub fn on(self, method: Method, path: &str, body: Value) -> Self {
        self.push(method, path, Reply::Json(body))
    }

    pub fn fail(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.push(method, path, Reply::Status(status, body))
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<Request> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &Request) -> Result<Value> {
        self.calls.borrow_mut().push(request.clone());
        let route = self
            .routes
            .iter()
            .find(|r| r.method == request.method && r.path == request.path);
        let Some(route) = route else {
            return Err(Error::Api {
                status: 404,
                message: "404 Not Found".into(),
                body: json!({ "error": format!("no route for {} {}", request.method, request.path) }),
            });
        };
        let reply = {
            let mut replies = route.replies.borrow_mut();
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };
        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(status, body)) => {
                let status = StatusCode::from_u16(status).unwrap();
                interpret_response(status, &body.to_string())
            }
            None => Ok(Value::Null),
        }
    }

    fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }
}

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Answer {
    /// Select the first item whose label contains this text.
    Choose(&'static str),
    /// Multi-select every item whose label contains one of these texts.
    ChooseMany(Vec<&'static str>),
    Text(&'static str),
    Confirm(bool),
    Cancel,
}

/// Console fed from a script. Running out of answers behaves like the user
/// cancelling, which lets menu loops unwind naturally.
#[derive(Default)]
pub struct ScriptedConsole {
    answers: VecDeque<Answer>,
    pub menus: Vec<(String, Vec<String>)>,
    pub notices: Vec<(Level, String)>,
    pub progress: Vec<String>,
    pub non_interactive: bool,
}

impl ScriptedConsole {
    pub fn new(answers: Vec<Answer>) -> Self {
        ScriptedConsole {
            answers: answers.into(),
            ..Default::default()
        }
    }

    pub fn headless() -> Self {
        ScriptedConsole {
            non_interactive: true,
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn has_notice(&self, level: Level, text: &str) -> bool {
        self.notices.iter().any(|(l, m)| *l == level && m.contains(text))
    }

    fn next(&mut self) -> Result<Answer> {
        match self.answers.pop_front() {
            None | Some(Answer::Cancel) => Err(Error::Cancelled),
            Some(answer) => Ok(answer),
        }
    }
}

impl Console for ScriptedConsole {
    fn is_interactive(&self) -> bool {
        !self.non_interactive
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        self.menus.push((prompt.to_string(), items.to_vec()));
        match self.next()? {
            Answer::Choose(label) => Ok(items
                .iter()
                .position(|i| i.contains(label))
                .unwrap_or_else(|| panic!("no item {label:?} in {prompt:?}: {items:?}"))),
            other => panic!("expected a choice for {prompt:?}, scripted {other:?}"),
        }
    }

    fn multi_select(&mut self, prompt: &str, items: &[String]) -> Result<Vec<usize>> {
        self.menus.push((prompt.to_string(), items.to_vec()));
        match self.next()? {
            Answer::ChooseMany(labels) => Ok(items
                .iter()
                .enumerate()
                .filter(|(_, item)| labels.iter().any(|l| item.contains(l)))
                .map(|(i, _)| i)
                .collect()),
            other => panic!("expected choices for {prompt:?}, scripted {other:?}"),
        }
    }

    fn text(&mut self, prompt: &str, _hint: &str) -> Result<String> {
        match self.next()? {
            Answer::Text(text) => Ok(text.to_string()),
            other => panic!("expected text for {prompt:?}, scripted {other:?}"),
        }
    }

    fn secret(&mut self, prompt: &str) -> Result<String> {
        self.text(prompt, "")
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self.next()? {
            Answer::Confirm(yes) => Ok(yes),
            other => panic!("expected confirmation for {prompt:?}, scripted {other:?}"),
        }
    }

    fn notify(&mut self, level: Level, message: &str) {
        self.notices.push((level, message.to_string()));
    }

    fn start_progress(&mut self, message: &str) {
        self.progress.push(message.to_string());
    }

    fn finish_progress(&mut self, message: &str) {
        self.progress.push(message.to_string());
    }
}

/// Everything a command handler needs, owned, so a test can run a handler
/// and then inspect each part.
pub struct Rig {
    pub store: MemoryTokenStore,
    pub transport: FakeTransport,
    pub console: ScriptedConsole,
    pub out: Vec<u8>,
}

impl Rig {
    /// Logged in as `pk_test`.
    pub fn new(transport: FakeTransport, console: ScriptedConsole) -> Self {
        Rig {
            store: MemoryTokenStore::with_token("pk_test"),
            transport,
            console,
            out: Vec::new(),
        }
    }

    pub fn logged_out(mut self) -> Self {
        self.store = MemoryTokenStore::default();
        self
    }

    pub fn session(&mut self, mode: OutputMode) -> Session<'_> {
        Session {
            store: &self.store,
            transport: &mut self.transport,
            console: &mut self.console,
            out: &mut self.out,
            mode,
        }
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}
