use std::collections::BTreeMap;

use crate::runtime::contract::{FunctionListing, FunctionMetadata};

/// Port over the function-enumeration source. Only the key set of the
/// listing drives synchronization.
#[allow(async_fn_in_trait)]
pub trait FunctionCatalog {
    async fn list_applicable_functions(&self) -> Result<FunctionListing, String>;
}

pub struct LambdaFunctionCatalog {
    lambda_client: aws_sdk_lambda::Client,
    function_name_prefix: Option<String>,
}

impl LambdaFunctionCatalog {
    pub fn new(
        lambda_client: aws_sdk_lambda::Client,
        function_name_prefix: Option<String>,
    ) -> Self {
        Self {
            lambda_client,
            function_name_prefix,
        }
    }
}

impl FunctionCatalog for LambdaFunctionCatalog {
    async fn list_applicable_functions(&self) -> Result<FunctionListing, String> {
        let mut functions = BTreeMap::new();
        let mut pages = self.lambda_client.list_functions().into_paginator().send();

        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|error| format!("failed to list lambda functions: {error}"))?;
            for function in page.functions() {
                let Some(function_name) = function.function_name() else {
                    continue;
                };
                if !is_applicable(self.function_name_prefix.as_deref(), function_name) {
                    continue;
                }
                functions.insert(
                    function_name.to_string(),
                    FunctionMetadata {
                        function_arn: function.function_arn().map(str::to_string),
                        runtime: function
                            .runtime()
                            .map(|runtime| runtime.as_str().to_string()),
                    },
                );
            }
        }

        Ok(functions)
    }
}

fn is_applicable(function_name_prefix: Option<&str>, function_name: &str) -> bool {
    match function_name_prefix {
        Some(prefix) => function_name.starts_with(prefix),
        None => true,
    }
}
