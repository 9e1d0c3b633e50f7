mod canvas;
pub mod mesh_overlay_compositor;
