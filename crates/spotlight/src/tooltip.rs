#![forbid(unsafe_code)]

//! Built-in tooltip container.
//!
//! [`TourBox`] is a ready-made tooltip body: a title plus back / next
//! buttons (and an optional pause button). It produces a plain
//! [`TourBoxView`] for the host to paint and maps button presses to tour
//! navigation.
//!
//! ```
//! use spotlight::tooltip::{TourBox, TourBoxButton};
//!
//! let tour_box = TourBox::new("Welcome").next_label("Continue");
//! assert_eq!(tour_box.title(), "Welcome");
//! # let _ = TourBoxButton::Next;
//! ```

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use spotlight_core::color::Rgba;

use crate::error::Result;
use crate::tour::RenderProps;

/// Text styling carried through to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub fg: Rgba,
    pub bg: Option<Rgba>,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fg: Rgba::BLACK,
            bg: None,
            bold: false,
        }
    }
}

impl TextStyle {
    #[must_use]
    pub const fn new(fg: Rgba) -> Self {
        Self {
            fg,
            bg: None,
            bold: false,
        }
    }

    #[must_use]
    pub const fn bg(mut self, bg: Rgba) -> Self {
        self.bg = Some(bg);
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Buttons of a [`TourBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourBoxButton {
    Back,
    Next,
    Pause,
}

/// A rendered button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub button: TourBoxButton,
    pub label: String,
    pub style: TextStyle,
    pub enabled: bool,
}

/// What the host paints for a [`TourBox`].
#[derive(Debug, Clone, PartialEq)]
pub struct TourBoxView {
    pub title: String,
    pub title_style: TextStyle,
    pub buttons: Vec<ButtonView>,
}

impl TourBoxView {
    pub fn button(&self, button: TourBoxButton) -> Option<&ButtonView> {
        self.buttons.iter().find(|view| view.button == button)
    }
}

/// Default tooltip body with navigation buttons.
#[derive(Debug, Clone, PartialEq)]
pub struct TourBox {
    title: String,
    back_label: String,
    next_label: String,
    done_label: String,
    pause_label: String,
    title_style: TextStyle,
    button_style: TextStyle,
    hide_back: bool,
    hide_next: bool,
    show_pause: bool,
}

impl TourBox {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            back_label: "Back".to_string(),
            next_label: "Next".to_string(),
            done_label: "Done".to_string(),
            pause_label: "Pause".to_string(),
            title_style: TextStyle::default().bold(),
            button_style: TextStyle::default(),
            hide_back: false,
            hide_next: false,
            show_pause: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn back_label(mut self, label: impl Into<String>) -> Self {
        self.back_label = label.into();
        self
    }

    #[must_use]
    pub fn next_label(mut self, label: impl Into<String>) -> Self {
        self.next_label = label.into();
        self
    }

    /// Label of the next button on the last step.
    #[must_use]
    pub fn done_label(mut self, label: impl Into<String>) -> Self {
        self.done_label = label.into();
        self
    }

    #[must_use]
    pub fn pause_label(mut self, label: impl Into<String>) -> Self {
        self.pause_label = label.into();
        self
    }

    #[must_use]
    pub fn title_style(mut self, style: TextStyle) -> Self {
        self.title_style = style;
        self
    }

    #[must_use]
    pub fn button_style(mut self, style: TextStyle) -> Self {
        self.button_style = style;
        self
    }

    #[must_use]
    pub fn hide_back(mut self, hide: bool) -> Self {
        self.hide_back = hide;
        self
    }

    #[must_use]
    pub fn hide_next(mut self, hide: bool) -> Self {
        self.hide_next = hide;
        self
    }

    #[must_use]
    pub fn show_pause(mut self, show: bool) -> Self {
        self.show_pause = show;
        self
    }

    /// Lay out the box for the current step.
    ///
    /// Back is disabled on the first step; next reads as the done label on
    /// the last one.
    pub fn view(&self, props: &RenderProps) -> TourBoxView {
        let mut buttons = Vec::with_capacity(3);
        if !self.hide_back {
            buttons.push(self.button(TourBoxButton::Back, &self.back_label, !props.is_first));
        }
        if self.show_pause {
            buttons.push(self.button(TourBoxButton::Pause, &self.pause_label, true));
        }
        if !self.hide_next {
            let label = if props.is_last {
                &self.done_label
            } else {
                &self.next_label
            };
            buttons.push(self.button(TourBoxButton::Next, label, true));
        }
        TourBoxView {
            title: self.title.clone(),
            title_style: self.title_style,
            buttons,
        }
    }

    fn button(&self, button: TourBoxButton, label: &str, enabled: bool) -> ButtonView {
        ButtonView {
            button,
            label: label.to_string(),
            style: self.button_style,
            enabled,
        }
    }

    /// Run the navigation bound to `button`.
    pub fn press(
        &self,
        button: TourBoxButton,
        props: &RenderProps,
    ) -> LocalBoxFuture<'static, Result<()>> {
        match button {
            TourBoxButton::Back if !self.hide_back && !props.is_first => props.previous(),
            TourBoxButton::Next if !self.hide_next => props.next(),
            TourBoxButton::Pause if self.show_pause => {
                props.pause();
                future::ready(Ok(())).boxed_local()
            }
            _ => future::ready(Ok(())).boxed_local(),
        }
    }
}
