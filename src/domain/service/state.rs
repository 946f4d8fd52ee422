//! Service state containers — app-owned, SDK-provided update logic.

use super::{Info, Status};

/// Latest known info of every service, in first-seen order.
///
/// The app owns instances of this type and applies each streamed [`Info`].
#[derive(Debug, Clone, Default)]
pub struct ServiceBoard {
    services: Vec<Info>,
}

impl ServiceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry with the same name, or append a new one.
    pub fn apply(&mut self, info: Info) {
        match self.services.iter_mut().find(|s| s.name == info.name) {
            Some(existing) => *existing = info,
            None => self.services.push(info),
        }
    }

    /// Replace all services (e.g. from a REST listing).
    pub fn replace(&mut self, services: Vec<Info>) {
        self.services.clear();
        for info in services {
            self.apply(info);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Info> {
        self.services.iter().find(|s| s.name.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Info> {
        self.services.iter()
    }

    pub fn running(&self) -> impl Iterator<Item = &Info> {
        self.services.iter().filter(|s| s.status == Status::Running)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ServiceName;

    fn info(name: &str, status: Status) -> Info {
        Info {
            name: ServiceName::from(name),
            description: String::new(),
            status,
            autostart: true,
            restart: true,
            restart_delay: 3.0,
        }
    }

    #[test]
    fn test_apply_keeps_first_seen_order() {
        let mut board = ServiceBoard::new();
        board.apply(info("b", Status::Starting));
        board.apply(info("a", Status::Running));
        board.apply(info("b", Status::Running));

        let names: Vec<_> = board.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(board.get("b").unwrap().status, Status::Running);
        assert_eq!(board.running().count(), 2);
    }

    #[test]
    fn test_stopped_services_are_not_running() {
        let mut board = ServiceBoard::new();
        board.apply(info("a", Status::Running));
        board.apply(info("a", Status::Stopped));
        assert_eq!(board.len(), 1);
        assert_eq!(board.running().count(), 0);
        assert!(board.get("missing").is_none());
    }

    #[test]
    fn test_replace() {
        let mut board = ServiceBoard::new();
        board.apply(info("old", Status::Running));
        board.replace(vec![info("x", Status::Stopped), info("y", Status::Running)]);
        assert!(board.get("old").is_none());
        assert_eq!(board.len(), 2);
        assert!(!board.is_empty());
    }
}
