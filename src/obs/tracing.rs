// self
use crate::{_prelude::*, obs::OpKind};

/// A span builder used by bridge operations.
#[derive(Clone, Debug)]
pub(crate) struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub(crate) fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("mobile_backend_bridge.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub(crate) fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub(crate) fn instrument<Fut>(&self, fut: Fut) -> impl Future<Output = Fut::Output> + use<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub(crate) struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Emits a debug event when tracing is enabled.
macro_rules! trace_debug {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			tracing::debug!($($arg)*);
		}
	};
}
/// Emits a warning event when tracing is enabled.
macro_rules! trace_warn {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			tracing::warn!($($arg)*);
		}
	};
}
pub(crate) use {trace_debug, trace_warn};
