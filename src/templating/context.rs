//! Render contexts and the dummy context used for smoke rendering.
//!
//! A [`RenderContext`] maps variable names to [`ContextValue`]s. Most values
//! are plain JSON; two kinds need special handling when the context is handed
//! to Tera:
//!
//! - [`DummyForm`] - a form-like object whose fields expose their value as
//!   `form.<field>.value`
//! - [`Callable`] - a zero-argument function, registered as a Tera function so
//!   templates call it as `{{ current_url() }}`
//!
//! [`build_dummy_context`] produces the shared context that every non-skipped
//! template must render against.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tera::Context as TeraContext;

use crate::constants::{DEFAULT_HELP_ARTICLE, DUMMY_CURRENT_URL, SHALLOW_TESTED_KEY};
use crate::users::UserDirectory;

type CallableFn = dyn Fn() -> Value + Send + Sync;

/// A zero-argument function exposed to templates.
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    pub fn new(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A callable that always returns `value`.
    pub fn returning(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move || value.clone())
    }

    pub fn call(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// One field of a [`DummyForm`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    value: Value,
}

impl FormField {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A form-like object with named fields.
///
/// Serialized as `{"<field>": {"value": ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DummyForm {
    fields: BTreeMap<String, FormField>,
}

impl DummyForm {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), FormField::new(value));
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A value in a [`RenderContext`].
#[derive(Debug, Clone)]
pub enum ContextValue {
    Json(Value),
    Form(DummyForm),
    Callable(Callable),
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        ContextValue::Json(value)
    }
}

impl From<DummyForm> for ContextValue {
    fn from(form: DummyForm) -> Self {
        ContextValue::Form(form)
    }
}

impl From<Callable> for ContextValue {
    fn from(callable: Callable) -> Self {
        ContextValue::Callable(callable)
    }
}

/// Variables available to a single render.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    values: BTreeMap<String, ContextValue>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        self.values.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert any serializable value as JSON.
    pub fn insert_serialized<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let key = key.into();
        let json = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize context value '{}'", key))?;
        self.values.insert(key, ContextValue::Json(json));
        Ok(())
    }

    /// Build a context from the entries of a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().map(|(k, v)| (k, ContextValue::Json(v))).collect(),
            }),
            other => anyhow::bail!("Context must be a JSON object, got: {}", other),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shallow merge: every key of `overrides` replaces the key here.
    pub fn merge(&mut self, overrides: RenderContext) {
        self.values.extend(overrides.values);
    }

    /// Whether the context carries `shallow_tested = true`.
    pub fn is_shallow(&self) -> bool {
        matches!(self.values.get(SHALLOW_TESTED_KEY), Some(ContextValue::Json(Value::Bool(true))))
    }

    /// Callables to register as template functions.
    pub fn callables(&self) -> impl Iterator<Item = (&str, &Callable)> {
        self.values.iter().filter_map(|(key, value)| match value {
            ContextValue::Callable(callable) => Some((key.as_str(), callable)),
            _ => None,
        })
    }

    /// The data portion of the context as a JSON object; callables are left out.
    pub fn to_json(&self) -> Result<Value> {
        let mut map = Map::new();
        for (key, value) in &self.values {
            match value {
                ContextValue::Json(json) => {
                    map.insert(key.clone(), json.clone());
                }
                ContextValue::Form(form) => {
                    let json = serde_json::to_value(form)
                        .with_context(|| format!("Failed to serialize form '{}'", key))?;
                    map.insert(key.clone(), json);
                }
                ContextValue::Callable(_) => {}
            }
        }
        Ok(Value::Object(map))
    }

    /// Convert to a Tera context.
    pub fn to_tera(&self) -> Result<TeraContext> {
        let json = self.to_json()?;
        TeraContext::from_value(json).context("Failed to build template context")
    }

    /// Variable paths for diagnostics: top-level names, one level of nested
    /// object keys, and callables written as `name()`.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (key, value) in &self.values {
            match value {
                ContextValue::Json(Value::Object(map)) => {
                    names.push(key.clone());
                    names.extend(map.keys().map(|nested| format!("{}.{}", key, nested)));
                }
                ContextValue::Form(form) => {
                    names.push(key.clone());
                    names.extend(form.field_names().map(|field| format!("{}.{}.value", key, field)));
                }
                ContextValue::Callable(_) => names.push(format!("{}()", key)),
                ContextValue::Json(_) => names.push(key.clone()),
            }
        }
        names
    }
}

/// The shared dummy context, with `overrides` merged on top.
///
/// `user_profile` and `user` are the profile of `email` in `users`; a missing
/// user is an error. `shallow_tested` is always present so renders made with
/// this context are recorded as shallow.
pub fn build_dummy_context(
    users: &dyn UserDirectory,
    email: &str,
    overrides: RenderContext,
) -> Result<RenderContext> {
    let user_profile = users
        .get_user_profile_by_email(email)
        .context("Failed to build the dummy template context")?;

    let mut context = RenderContext::new();
    context.insert("article", json!(DEFAULT_HELP_ARTICLE));
    context.insert(SHALLOW_TESTED_KEY, json!(true));
    context.insert_serialized("user_profile", &user_profile)?;
    context.insert_serialized("user", &user_profile)?;
    context.insert("product_name", json!("testing"));
    context.insert(
        "form",
        DummyForm::new()
            .with_field("full_name", "John Doe")
            .with_field("terms", true)
            .with_field("email", user_profile.email.clone())
            .with_field("emails", user_profile.email.clone()),
    );
    context.insert("current_url", Callable::returning(DUMMY_CURRENT_URL));
    context.insert("hubot_lozenges_dict", json!({}));
    context.insert("integrations_dict", json!({}));
    context.insert(
        "referrer",
        json!({
            "full_name": "John Doe",
            "realm": { "name": "zulip.com" },
        }),
    );
    context.insert("uid", json!("uid"));
    context.insert("token", json!("token"));
    context.insert("message_count", json!(0));
    context.insert("messages", json!([{ "header": "Header" }]));
    context.insert("new_streams", json!({ "html": "" }));
    context.insert("data", json!({ "title": "Title" }));

    context.merge(overrides);
    Ok(context)
}

/// Builds dummy contexts for a fixed user directory and email.
#[derive(Clone)]
pub struct DummyContextFactory {
    users: Arc<dyn UserDirectory>,
    email: String,
}

impl DummyContextFactory {
    pub fn new(users: Arc<dyn UserDirectory>, email: impl Into<String>) -> Self {
        Self {
            users,
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn build(&self, overrides: RenderContext) -> Result<RenderContext> {
        build_dummy_context(self.users.as_ref(), &self.email, overrides)
    }
}

impl fmt::Debug for DummyContextFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyContextFactory").field("email", &self.email).finish_non_exhaustive()
    }
}

/// Overrides for the deferred pass: `data` becomes a list of pairs.
pub fn deferred_overrides() -> RenderContext {
    RenderContext::new().with("data", json!([["one", "two"]]))
}
