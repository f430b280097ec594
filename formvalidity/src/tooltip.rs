//! Tooltip display.
//!
//! Shows the first error of an invalid field in the field's popover and
//! hides it when the field becomes valid. Delays are passed through to the
//! popover primitive and never affect validity.

use std::time::Duration;

use formdom::NodeId;
use log::trace;

use crate::config::TooltipConfig;
use crate::dom::Dom;

#[derive(Debug, Clone)]
pub struct TooltipLayer {
    config: TooltipConfig,
    batch_shown: u32,
}

impl TooltipLayer {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            config,
            batch_shown: 0,
        }
    }

    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    /// Start a new submit batch; the next batch tooltip shows without delay.
    pub fn begin_batch(&mut self) {
        self.batch_shown = 0;
    }

    /// Show the first of `errors` on `node`.
    pub fn show(&mut self, dom: &mut dyn Dom, node: NodeId, errors: &[String], batch: bool) {
        let Some((placement, align)) = self.config.display.placement() else {
            return;
        };
        let Some(message) = errors.first() else {
            return;
        };

        let visible = dom.popover_visible(node);
        let delay = if batch {
            let delay = self.config.stagger * self.batch_shown;
            self.batch_shown += 1;
            delay
        } else if visible {
            self.config.refresh_delay
        } else {
            Duration::ZERO
        };

        if visible {
            dom.hide_popover(node);
        }
        trace!("tooltip on {node} in {delay:?}: {message}");
        dom.show_popover(node, message, placement, align, delay);
    }

    pub fn hide(&self, dom: &mut dyn Dom, node: NodeId) {
        if self.config.display.placement().is_some() {
            dom.hide_popover(node);
        }
    }
}
