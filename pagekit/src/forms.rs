//! Loading state for submitted forms.

use crate::context::PageContext;
use crate::page::{ElementId, Page, Selector};
use crate::scheduler::SchedulerExt;
use std::sync::Arc;
use tracing::debug;

const SPINNER: &str = r#"<i class="fas fa-spinner fa-spin"></i>"#;

fn submit_controls() -> [Selector; 2] {
    [
        Selector::tag("button").with_attr_eq("type", "submit"),
        Selector::tag("input").with_attr_eq("type", "submit"),
    ]
}

/// Disables a form's submit control while it submits.
#[derive(Debug)]
pub struct FormLoading {
    ctx: PageContext,
    form: ElementId,
}

impl FormLoading {
    /// Binds to the first form matching `selector`.
    ///
    /// Returns `None` when no form matches.
    pub fn bind(ctx: PageContext, selector: &Selector) -> Option<Self> {
        let form = ctx.page().query_selector(selector)?;
        Some(Self { ctx, form })
    }

    /// The bound form.
    #[must_use]
    pub fn form(&self) -> ElementId {
        self.form
    }

    /// Handles the form's `submit` event.
    ///
    /// The submit control is disabled and shows the loading label, then is
    /// restored after the configured delay. A control that is already
    /// disabled is left alone. Returns the control, if there is one.
    pub fn on_submit(&self) -> Option<ElementId> {
        let page = self.ctx.page();
        let control = page.query_selector_in(self.form, &submit_controls())?;
        let config = &self.ctx.config().forms;

        let original = page.update(control, |el| {
            if el.disabled {
                return None;
            }
            let is_button = el.tag == "button";
            let original = if is_button || el.value.is_empty() {
                el.content.clone()
            } else {
                el.value.clone()
            };
            el.disabled = true;
            if is_button {
                el.content = format!("{SPINNER} {}", config.loading_label);
            } else {
                el.value.clone_from(&config.loading_label);
            }
            Some(original)
        })??;

        let restore_page = Arc::clone(page);
        self.ctx
            .scheduler()
            .schedule_fn(config.restore_after(), move || restore(&restore_page, control, original));
        debug!(form = %self.form, control = %control, "Form submitting");
        Some(control)
    }
}

fn restore(page: &Page, control: ElementId, original: String) {
    page.update(control, |el| {
        el.disabled = false;
        if el.tag == "button" {
            el.content = original;
        } else {
            el.value = original;
        }
    });
}
