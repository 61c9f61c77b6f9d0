pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fresh id for a whiteboard component, unique across sessions and rooms.
pub fn new_component_id() -> String {
    format!("component-{}", new_id())
}
