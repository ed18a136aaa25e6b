use super::Handler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    // Сотрудник helpdesk: видит очередь заявок и меняет их статус
    Staff,
    // Заявитель: может только оставить заявку
    Requester,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user_id: i64,
    pub username: String,
}

impl Session {
    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    pub fn as_handler(&self) -> Handler {
        Handler {
            id: Some(self.user_id),
            username: Some(self.username.clone()),
        }
    }
}
