mod build;
mod interaction;
mod render;
mod view;

pub(in crate::app) use interaction::{Gesture, InteractionState, PointerEvent};
pub(in crate::app) use render::{RenderStyle, render_scene};
