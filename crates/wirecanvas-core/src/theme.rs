//! Theme palettes and per-kind style resolution.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::component::{Component, ComponentKind, ComponentProps, FontWeight, TextAlign};

/// Theme variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Color palette used for the canvas chrome and component defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub mode: ThemeMode,
    pub background: Rgba,
    pub grid: Rgba,
    pub pen: Rgba,
    pub selection: Rgba,
    pub handle_fill: Rgba,
    pub preview_fill: Rgba,
    pub surface: Rgba,
    pub border: Rgba,
    pub text: Rgba,
    pub muted_text: Rgba,
    pub accent: Rgba,
    pub accent_text: Rgba,
    pub placeholder_fill: Rgba,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            background: Rgba::rgb(250, 250, 250),
            grid: Rgba::new(200, 200, 200, 100),
            pen: Rgba::rgb(30, 30, 30),
            selection: Rgba::rgb(59, 130, 246),
            handle_fill: Rgba::WHITE,
            preview_fill: Rgba::new(59, 130, 246, 40),
            surface: Rgba::WHITE,
            border: Rgba::rgb(100, 100, 100),
            text: Rgba::rgb(30, 30, 30),
            muted_text: Rgba::rgb(150, 150, 150),
            accent: Rgba::rgb(59, 130, 246),
            accent_text: Rgba::WHITE,
            placeholder_fill: Rgba::rgb(220, 220, 220),
        }
    }

    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            background: Rgba::rgb(30, 30, 34),
            grid: Rgba::new(80, 80, 90, 120),
            pen: Rgba::rgb(235, 235, 235),
            selection: Rgba::rgb(96, 165, 250),
            handle_fill: Rgba::rgb(30, 30, 34),
            preview_fill: Rgba::new(96, 165, 250, 50),
            surface: Rgba::rgb(45, 45, 52),
            border: Rgba::rgb(160, 160, 170),
            text: Rgba::rgb(235, 235, 235),
            muted_text: Rgba::rgb(120, 120, 130),
            accent: Rgba::rgb(96, 165, 250),
            accent_text: Rgba::rgb(15, 15, 20),
            placeholder_fill: Rgba::rgb(70, 70, 78),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

/// Drawing tool settings owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingSettings {
    /// Fill the shape preview with a translucent tint.
    pub shape_fill: bool,
    pub pen_width: f64,
    /// Pen stroke opacity in `0..=1`.
    pub pen_opacity: f64,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            shape_fill: true,
            pen_width: 2.0,
            pen_opacity: 1.0,
        }
    }
}

/// Fully resolved visuals for one component.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub background: Rgba,
    pub border: Rgba,
    pub text_color: Rgba,
    pub border_width: f64,
    pub border_radius: f64,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
}

impl ResolvedStyle {
    /// Fill missing properties with defaults for the component's kind.
    pub fn resolve(component: &Component, theme: &Theme) -> Self {
        let defaults = Self::defaults(component.kind, theme);
        let p = &component.props;
        Self {
            background: p.background_color.unwrap_or(defaults.background),
            border: p.border_color.unwrap_or(defaults.border),
            text_color: p.text_color.unwrap_or(defaults.text_color),
            border_width: p.border_width.unwrap_or(defaults.border_width).max(0.0),
            border_radius: p.border_radius.unwrap_or(defaults.border_radius).max(0.0),
            font_size: p.font_size.unwrap_or(defaults.font_size).max(1.0),
            font_weight: p.font_weight.unwrap_or(defaults.font_weight),
            text_align: p.text_align.unwrap_or(defaults.text_align),
        }
    }

    /// Every property spelled out, so the values no longer follow the theme.
    pub fn into_props(self) -> ComponentProps {
        ComponentProps {
            background_color: Some(self.background),
            border_color: Some(self.border),
            text_color: Some(self.text_color),
            border_width: Some(self.border_width),
            border_radius: Some(self.border_radius),
            font_size: Some(self.font_size),
            font_weight: Some(self.font_weight),
            text_align: Some(self.text_align),
            ..ComponentProps::default()
        }
    }

    /// Theme defaults for a component kind.
    pub fn defaults(kind: ComponentKind, theme: &Theme) -> Self {
        let base = Self {
            background: theme.surface,
            border: theme.border,
            text_color: theme.text,
            border_width: 1.0,
            border_radius: 0.0,
            font_size: 14.0,
            font_weight: FontWeight::Normal,
            text_align: TextAlign::Left,
        };
        match kind {
            ComponentKind::Rectangle | ComponentKind::Circle => base,
            ComponentKind::Button => Self {
                background: theme.accent,
                border: theme.accent,
                text_color: theme.accent_text,
                border_radius: 6.0,
                font_weight: FontWeight::Bold,
                text_align: TextAlign::Center,
                ..base
            },
            ComponentKind::Input => Self {
                text_color: theme.muted_text,
                border_radius: 4.0,
                ..base
            },
            ComponentKind::Text => Self {
                background: Rgba::TRANSPARENT,
                border: Rgba::TRANSPARENT,
                border_width: 0.0,
                font_size: 16.0,
                ..base
            },
            ComponentKind::Image => Self {
                background: theme.placeholder_fill,
                ..base
            },
            ComponentKind::Group => Self {
                background: Rgba::TRANSPARENT,
                border: theme.muted_text,
                ..base
            },
        }
    }
}
