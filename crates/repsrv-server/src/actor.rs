use repsrv_store::WellKnownIris;
use repsrv_types::{Iri, Resource};
use serde_json::{json, Value};

use crate::endpoint::endpoints;

const ACTIVITYSTREAMS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

/// The profile of the server's single actor.
pub fn profile(iris: &WellKnownIris, origin: &Iri, name: &str) -> Resource {
    let mut profile = Resource::new().with_id(iris.actor());
    profile.set_property("@context", json!(ACTIVITYSTREAMS_CONTEXT));
    profile.set_property("type", json!("Person"));
    profile.set_property("name", json!(name));
    profile.set_property("preferredUsername", json!(name));
    for (kind, iri) in iris.iter() {
        if let Some(property) = kind.profile_property() {
            profile.set_property(property, Value::String(iri.to_string()));
        }
    }
    profile.set_property(
        "endpoints",
        json!({
            "oauthAuthorizationEndpoint": origin.with_path(endpoints::AUTH).as_str(),
            "oauthTokenEndpoint": origin.with_path(endpoints::TOKEN).as_str(),
        }),
    );
    profile
}
