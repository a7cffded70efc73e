//! buck2 query handlers.

use crate::app::ExplorerState;
use buck2_cli_ops::{attributes, providers, status, targets, Buck2CliOpsError, TargetQuery};
use explorer_ipc::{error_codes, HandlerRegistry, Operation, QueryArgs, Request, Response};
use std::path::PathBuf;
use tracing::{info_span, warn, Instrument};

#[derive(Debug, Clone)]
pub struct Buck2CoreError {
    pub code: String,
    pub message: String,
    pub data: serde_json::Value,
}

/// Register the status and target query handlers.
pub async fn register(registry: &HandlerRegistry, state: ExplorerState) {
    for operation in [
        Operation::Status,
        Operation::Targets,
        Operation::Attributes,
        Operation::Providers,
    ] {
        register_query(registry, operation, state.clone()).await;
    }
}

/// Core logic for `buck2-status`.
pub async fn status_core(state: &ExplorerState) -> Result<serde_json::Value, Buck2CoreError> {
    let working_dir = working_dir(state).await?;
    status(&state.runner, &working_dir)
        .await
        .map_err(map_buck2_error)
}

/// Core logic for the three target queries.
pub async fn query_core(
    state: &ExplorerState,
    operation: Operation,
    params: Option<&serde_json::Value>,
) -> Result<serde_json::Value, Buck2CoreError> {
    let query = parse_query(params)?;
    let working_dir = working_dir(state).await?;
    let runner = &state.runner;

    let result = match operation {
        Operation::Targets => targets(runner, &working_dir, &query)
            .await
            .map(|labels| serde_json::json!(labels)),
        Operation::Attributes => attributes(runner, &working_dir, &query).await,
        Operation::Providers => providers(runner, &working_dir, &query)
            .await
            .map(|result| serde_json::json!(result)),
        other => Err(Buck2CliOpsError::InvalidParams {
            message: format!("{other} is not a target query"),
        }),
    };
    result.map_err(map_buck2_error)
}

async fn handle(state: &ExplorerState, req: &Request) -> Result<serde_json::Value, Buck2CoreError> {
    match req.method {
        Operation::Status => status_core(state).await,
        operation => query_core(state, operation, req.params.as_ref()).await,
    }
}

async fn register_query(registry: &HandlerRegistry, operation: Operation, state: ExplorerState) {
    registry
        .register(operation, move |req| {
            let state = state.clone();
            let span = info_span!("buck2", operation = %req.method, request_id = %req.id);
            async move {
                match handle(&state, &req).await {
                    Ok(result) => Response::success(&req.id, result),
                    Err(err) => {
                        warn!(code = %err.code, message = %err.message, "buck2 query failed");
                        buck2_error_response(&req.id, err)
                    }
                }
            }
            .instrument(span)
        })
        .await;
}

fn parse_query(params: Option<&serde_json::Value>) -> Result<TargetQuery, Buck2CoreError> {
    let args = QueryArgs::from_params(params).map_err(|err| Buck2CoreError {
        code: "invalid_params".to_string(),
        message: format!("invalid parameters: {err}"),
        data: serde_json::json!({ "code": "invalid_params" }),
    })?;

    Ok(TargetQuery {
        target: args.target,
        host: args.host,
        mode: args.mode,
    })
}

async fn working_dir(state: &ExplorerState) -> Result<PathBuf, Buck2CoreError> {
    let dir = state.buck_dir().await;
    if dir.is_empty() {
        return Err(map_buck2_error(Buck2CliOpsError::NotABuckProject {
            message: "no Buck project directory selected".to_string(),
            exit_code: None,
            stderr: String::new(),
            stdout: String::new(),
        }));
    }
    Ok(PathBuf::from(dir))
}

fn map_buck2_error(err: Buck2CliOpsError) -> Buck2CoreError {
    Buck2CoreError {
        code: err.code().to_string(),
        message: err.to_string(),
        data: err.details(),
    }
}

fn buck2_error_response(id: &str, err: Buck2CoreError) -> Response {
    Response::error_with_data(id, map_rpc_code(&err.code), &err.message, err.data)
}

fn map_rpc_code(machine_code: &str) -> i32 {
    match machine_code {
        "invalid_params" => error_codes::INVALID_PARAMS,
        "invalid_target" | "not_a_buck_project" => error_codes::NOT_FOUND,
        "buck2_not_installed" => error_codes::TOOL_UNAVAILABLE,
        "timeout" => error_codes::TIMEOUT,
        _ => error_codes::INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::test_support::{test_state, MISSING_BUCK2};
    use crate::dir_picker::ScriptedPicker;
    use std::sync::Arc;

    fn state() -> ExplorerState {
        test_state(
            Some(std::env::temp_dir()),
            Arc::new(ScriptedPicker::new(vec![])),
        )
    }

    #[test]
    fn parse_query_accepts_both_param_shapes() {
        let object = serde_json::json!({"target": "//app:server", "host": "linux"});
        let query = parse_query(Some(&object)).unwrap();
        assert_eq!(query, TargetQuery::new("//app:server").host("linux"));

        let positional = serde_json::json!(["//app:server", null, "mode/dev"]);
        let query = parse_query(Some(&positional)).unwrap();
        assert_eq!(query, TargetQuery::new("//app:server").mode("mode/dev"));
    }

    #[test]
    fn parse_query_rejects_missing_params() {
        let err = parse_query(None).unwrap_err();
        assert_eq!(err.code, "invalid_params");
        assert!(err.message.contains("invalid parameters"));
    }

    #[test]
    fn map_rpc_code_uses_expected_json_rpc_codes() {
        assert_eq!(map_rpc_code("invalid_params"), error_codes::INVALID_PARAMS);
        assert_eq!(map_rpc_code("invalid_target"), error_codes::NOT_FOUND);
        assert_eq!(map_rpc_code("not_a_buck_project"), error_codes::NOT_FOUND);
        assert_eq!(
            map_rpc_code("buck2_not_installed"),
            error_codes::TOOL_UNAVAILABLE
        );
        assert_eq!(map_rpc_code("timeout"), error_codes::TIMEOUT);
        assert_eq!(map_rpc_code("command_failed"), error_codes::INTERNAL_ERROR);
        assert_eq!(map_rpc_code("parse_error"), error_codes::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn missing_buck2_is_tool_unavailable() {
        let registry = HandlerRegistry::new();
        register(&registry, state()).await;

        let response = registry
            .dispatch(Request::with_params(
                Operation::Targets,
                serde_json::json!({"target": "//app/..."}),
            ))
            .await;

        let error = response.error.expect("expected an error");
        assert_eq!(error.code, error_codes::TOOL_UNAVAILABLE);
        let data = error.data.expect("expected error data");
        assert_eq!(data["code"], "buck2_not_installed");
        assert_eq!(data["executable"], MISSING_BUCK2);
    }

    #[tokio::test]
    async fn empty_target_is_invalid_params() {
        let err = query_core(
            &state(),
            Operation::Providers,
            Some(&serde_json::json!({"target": "  "})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "invalid_params");
    }

    #[tokio::test]
    async fn no_buck_dir_is_not_a_buck_project() {
        let state = state();
        state.set_buck_dir(String::new()).await;

        let err = status_core(&state).await.unwrap_err();
        assert_eq!(err.code, "not_a_buck_project");
        assert_eq!(map_rpc_code(&err.code), error_codes::NOT_FOUND);
    }

    #[tokio::test]
    async fn directory_queries_are_not_target_queries() {
        let err = query_core(
            &state(),
            Operation::CurrentBuckDir,
            Some(&serde_json::json!({"target": "//a:b"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "invalid_params");
    }
}
