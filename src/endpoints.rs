//! Typed operations over the REST surface.
//!
//! Every call returns the normalized JSON (`raw`, what `--json` prints)
//! next to its decoded form (`data`, what humans and menus see).

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::api::{Request, Transport};
use crate::error::Result;
use crate::models::{Event, Group, KarmaEntry, Me, Poll, Topic};
use crate::normalize::{
    decode_list, decode_resource, EVENT_KEYS, EVENT_LIST_KEYS, GROUP_KEYS, GROUP_LIST_KEYS,
    KARMA_LIST_KEYS, POLL_KEYS, TOPIC_LIST_KEYS,
};

#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub raw: Value,
    pub data: T,
}

/// The Pikarama API as seen through some transport.
#[derive(Clone, Copy)]
pub struct Pikarama<'a> {
    transport: &'a dyn Transport,
}

impl<'a> Pikarama<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Pikarama { transport }
    }

    fn list<T: DeserializeOwned>(&self, request: Request, keys: &[&str]) -> Result<Fetched<Vec<T>>> {
        let payload = self.transport.send(&request)?;
        let (raw, data) = decode_list(&payload, keys)?;
        Ok(Fetched { raw, data })
    }

    fn one<T: DeserializeOwned>(&self, request: Request, keys: &[&str]) -> Result<Fetched<T>> {
        let payload = self.transport.send(&request)?;
        let (raw, data) = decode_resource(&payload, keys)?;
        Ok(Fetched { raw, data })
    }

    pub fn groups(&self) -> Result<Fetched<Vec<Group>>> {
        self.list(Request::get("/groups"), GROUP_LIST_KEYS)
    }

    pub fn group(&self, group_id: &str) -> Result<Fetched<Group>> {
        self.one(Request::get(format!("/groups/{group_id}")), GROUP_KEYS)
    }

    pub fn create_group(&self, name: &str) -> Result<Fetched<Group>> {
        let request = Request::post("/groups").with_body(json!({ "name": name }));
        self.one(request, GROUP_KEYS)
    }

    pub fn join_group(&self, code: &str) -> Result<Fetched<Group>> {
        let request = Request::post("/groups/join").with_body(json!({ "code": code }));
        self.one(request, GROUP_KEYS)
    }

    pub fn group_topics(&self, group_id: &str) -> Result<Vec<Topic>> {
        let request = Request::get(format!("/groups/{group_id}/topics"));
        Ok(self.list(request, TOPIC_LIST_KEYS)?.data)
    }

    /// Topics of a group: the embedded list when the group payload carried
    /// one, otherwise the topics sub-endpoint.
    pub fn topics_of(&self, group: &Group) -> Result<Vec<Topic>> {
        if !group.topics.is_empty() {
            return Ok(group.topics.clone());
        }
        self.group_topics(&group.id)
    }

    /// List events. `status` may be comma-joined (`submitting,voting`).
    pub fn events(&self, status: Option<&str>) -> Result<Fetched<Vec<Event>>> {
        let request = Request::get("/events").with_query(&[("status", json!(status))]);
        self.list(request, EVENT_LIST_KEYS)
    }

    pub fn event(&self, event_id: &str) -> Result<Fetched<Event>> {
        self.one(Request::get(format!("/events/{event_id}")), EVENT_KEYS)
    }

    pub fn create_event(&self, topic_id: &str, name: &str) -> Result<Fetched<Event>> {
        let request =
            Request::post("/events").with_body(json!({ "topicId": topic_id, "name": name }));
        self.one(request, EVENT_KEYS)
    }

    pub fn create_poll(&self, topic_id: &str, question: &str, options: &[String]) -> Result<Fetched<Poll>> {
        let request = Request::post("/events").with_body(json!({
            "topicId": topic_id,
            "name": question,
            "isPoll": true,
            "pollOptions": options,
        }));
        self.one(request, POLL_KEYS)
    }

    pub fn submit_pick(&self, event_id: &str, title: &str) -> Result<Value> {
        let request =
            Request::post(format!("/events/{event_id}/submit")).with_body(json!({ "title": title }));
        self.transport.send(&request)
    }

    pub fn vote(&self, event_id: &str, submission_id: &str) -> Result<Value> {
        let request = Request::post(format!("/events/{event_id}/vote"))
            .with_body(json!({ "submissionId": submission_id }));
        self.transport.send(&request)
    }

    pub fn vote_many(&self, event_id: &str, submission_ids: &[String]) -> Result<Value> {
        let request = Request::post(format!("/events/{event_id}/vote"))
            .with_body(json!({ "submissionIds": submission_ids }));
        self.transport.send(&request)
    }

    pub fn advance(&self, event_id: &str) -> Result<Value> {
        self.transport
            .send(&Request::post(format!("/events/{event_id}/advance")))
    }

    pub fn karma(&self, group_id: Option<&str>) -> Result<Fetched<Vec<KarmaEntry>>> {
        let request = Request::get("/karma").with_query(&[("groupId", json!(group_id))]);
        self.list(request, KARMA_LIST_KEYS)
    }

    pub fn me(&self) -> Result<Fetched<Me>> {
        self.one(Request::get("/me"), &[])
    }
}
