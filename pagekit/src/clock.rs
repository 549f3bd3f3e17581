//! The header clock showing Tashkent time.

use crate::context::PageContext;
use crate::format::{format_clock, offset_from_minutes};
use crate::page::ElementId;
use crate::scheduler::{SchedulerExt, TimerHandle};
use std::sync::Arc;
use tracing::debug;

/// A running clock widget.
#[derive(Debug)]
pub struct ClockWidget {
    ctx: PageContext,
    element: ElementId,
    timer: TimerHandle,
}

impl ClockWidget {
    /// Renders the time into the configured element now and on every tick.
    ///
    /// Returns `None` when the element does not exist.
    pub fn start(ctx: PageContext) -> Option<Self> {
        let config = &ctx.config().clock;
        let element = ctx.page().get_element_by_id(&config.element_id)?;
        let offset = offset_from_minutes(config.utc_offset_minutes);

        let page = Arc::clone(ctx.page());
        let scheduler = Arc::clone(ctx.scheduler());
        let render = move || {
            let text = format_clock(scheduler.now(), offset);
            page.update(element, |el| el.content = text);
        };

        render();
        let timer = ctx.scheduler().every(config.tick(), render);
        debug!(element = %element, %timer, "Clock started");
        Some(Self { ctx, element, timer })
    }

    /// The element being updated.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Stops ticking.
    pub fn stop(&self) -> bool {
        self.ctx.scheduler().cancel(self.timer)
    }
}

impl Drop for ClockWidget {
    fn drop(&mut self) {
        if self.stop() {
            debug!(timer = %self.timer, "Clock stopped on drop");
        }
    }
}
