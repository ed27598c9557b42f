//! Exposes the host plugin pipeline to Rolldown.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use duplex_core::host::PluginPipeline;
use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use tracing::trace;

use crate::options::ExternalPolicy;

/// Answers Rolldown's `resolve_id` and `load` from the host plugins, then
/// marks bare imports external according to the build's policy.
#[derive(Clone)]
pub struct HostPluginBridge {
    pipeline: Arc<PluginPipeline>,
    externals: ExternalPolicy,
}

impl HostPluginBridge {
    pub fn new(pipeline: Arc<PluginPipeline>, externals: ExternalPolicy) -> Self {
        Self {
            pipeline,
            externals,
        }
    }
}

impl fmt::Debug for HostPluginBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostPluginBridge")
            .field("plugins", &self.pipeline.len())
            .field("externals", &self.externals)
            .finish()
    }
}

impl Plugin for HostPluginBridge {
    fn name(&self) -> Cow<'static, str> {
        "duplex:host-plugins".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let pipeline = Arc::clone(&self.pipeline);
        let externals = self.externals.clone();

        async move {
            if let Some(id) = pipeline.resolve_id(&specifier) {
                return Ok(Some(HookResolveIdOutput {
                    id: id.into(),
                    external: Some(ResolvedExternal::Bool(false)),
                    ..Default::default()
                }));
            }

            if externals.is_external(&specifier) {
                trace!(specifier = %specifier, "external");
                return Ok(Some(HookResolveIdOutput {
                    id: specifier.into(),
                    external: Some(ResolvedExternal::Bool(true)),
                    ..Default::default()
                }));
            }

            Ok(None)
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let pipeline = Arc::clone(&self.pipeline);

        async move {
            Ok(pipeline.load(&id).map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}
