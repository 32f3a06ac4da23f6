//! Notification port between the download pipeline and the window.
//!
//! Background tasks only ever write into a [`Notifier`]; the frame loop drains
//! the matching receiver and turns each message into a short-lived toast.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::model::Notification;

/// How long a toast stays on screen
pub const TOAST_LIFETIME: Duration = Duration::from_millis(3500);

/// Sending half of the notification channel
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire-and-forget; a closed window just drops the message.
    pub fn notify(&self, notification: Notification) {
        log::debug!("notify: {}", notification.message());
        let _ = self.tx.send(notification);
    }
}

/// Toasts currently visible, oldest first
#[derive(Default)]
pub struct Toasts {
    active: Vec<(Notification, Instant)>,
}

impl Toasts {
    pub fn push(&mut self, notification: Notification, now: Instant) {
        self.active.push((notification, now));
    }

    /// Moves everything pending on `rx` into the visible list.
    pub fn drain_from(&mut self, rx: &mut UnboundedReceiver<Notification>, now: Instant) {
        while let Ok(notification) = rx.try_recv() {
            self.push(notification, now);
        }
    }

    /// Drops toasts older than [`TOAST_LIFETIME`].
    pub fn expire(&mut self, now: Instant) {
        self.active
            .retain(|(_, shown_at)| now.saturating_duration_since(*shown_at) < TOAST_LIFETIME);
    }

    pub fn visible(&self) -> impl Iterator<Item = Notification> + '_ {
        self.active.iter().map(|(n, _)| *n)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Paints the toasts stacked at the bottom centre of the window.
    pub fn show(&self, ctx: &eframe::egui::Context) {
        use eframe::egui;

        if self.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -56.0])
            .interactable(false)
            .show(ctx, |ui| {
                for notification in self.visible() {
                    let fill = if notification.is_failure() {
                        egui::Color32::from_rgb(120, 30, 30)
                    } else {
                        egui::Color32::from_rgb(40, 40, 40)
                    };
                    egui::Frame::none()
                        .fill(fill)
                        .rounding(8.0)
                        .inner_margin(egui::Margin::symmetric(12.0, 6.0))
                        .show(ui, |ui| {
                            ui.colored_label(egui::Color32::WHITE, notification.message());
                        });
                    ui.add_space(4.0);
                }
            });
    }
}
