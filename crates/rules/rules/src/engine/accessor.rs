use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::collector::AccessorRequest;
use crate::error::AccessorError;

/// An asynchronous provider of a parameter's raw value.
///
/// `params` are the caller-supplied external parameters of the evaluation,
/// shared by every accessor. `request` describes what the ruleset will test
/// on the returned value. Implementations must treat both as read-only.
#[async_trait]
pub trait Accessor: Send + Sync {
    /// Fetch the current value.
    async fn fetch(&self, params: &Value, request: &AccessorRequest)
    -> Result<Value, AccessorError>;
}

/// Accessor backed by a closure returning a future.
///
/// The closure receives borrowed arguments and must return a `'static`
/// future, so it clones whatever it needs before the `async move` block.
pub struct FnAccessor<F> {
    func: F,
}

impl<F> FnAccessor<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> std::fmt::Debug for FnAccessor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAccessor").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Accessor for FnAccessor<F>
where
    F: Fn(&Value, &AccessorRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, AccessorError>> + Send + 'static,
{
    async fn fetch(
        &self,
        params: &Value,
        request: &AccessorRequest,
    ) -> Result<Value, AccessorError> {
        (self.func)(params, request).await
    }
}

/// Wrap a closure into a shareable accessor.
///
/// ```
/// use tenet_rules::accessor_fn;
///
/// let quota = accessor_fn(|params, _request| {
///     let tenant = params.get("tenant").cloned();
///     async move { Ok(serde_json::json!({ "tenant": tenant, "used": 3 })) }
/// });
/// # let _ = quota;
/// ```
pub fn accessor_fn<F, Fut>(func: F) -> Arc<dyn Accessor>
where
    F: Fn(&Value, &AccessorRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, AccessorError>> + Send + 'static,
{
    Arc::new(FnAccessor::new(func))
}

/// Accessor that always yields the same value.
#[derive(Debug, Clone)]
pub struct StaticAccessor {
    value: Value,
}

impl StaticAccessor {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[async_trait]
impl Accessor for StaticAccessor {
    async fn fetch(
        &self,
        _params: &Value,
        _request: &AccessorRequest,
    ) -> Result<Value, AccessorError> {
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(name: &str) -> AccessorRequest {
        AccessorRequest {
            accessor_name: name.to_owned(),
            ..AccessorRequest::default()
        }
    }

    #[tokio::test]
    async fn static_accessor_returns_constant() {
        let accessor = StaticAccessor::new(true);
        let value = accessor.fetch(&json!({}), &request("pass")).await.unwrap();
        assert_eq!(value, json!(true));
        assert_eq!(accessor.value(), &json!(true));
    }

    #[tokio::test]
    async fn fn_accessor_sees_params_and_request() {
        let accessor = accessor_fn(|params, request| {
            let g = params.get("g").cloned().unwrap_or(Value::Null);
            let name = request.accessor_name.clone();
            async move { Ok(json!({ "g": g, "name": name })) }
        });
        let value = accessor
            .fetch(&json!({"g": 32000}), &request("g"))
            .await
            .unwrap();
        assert_eq!(value, json!({"g": 32000, "name": "g"}));
    }

    #[tokio::test]
    async fn fn_accessor_errors_pass_through() {
        let accessor = accessor_fn(|_, _| async { Err::<Value, AccessorError>("boom".into()) });
        let err = accessor.fetch(&json!({}), &request("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
