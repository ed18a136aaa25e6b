use crate::models::{HelpdeskRequest, RequestStatus, Session};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    // Значение статуса как пришло из формы; пустое - любой статус
    pub status: Option<String>,
    pub search: String,
}

impl RequestFilter {
    pub fn new(status: Option<&str>, search: Option<&str>) -> Self {
        Self {
            status: status
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            search: search.map(str::trim).unwrap_or_default().to_string(),
        }
    }

    pub fn matches(&self, request: &HelpdeskRequest) -> bool {
        if let Some(status) = &self.status {
            if !request.status.as_str().eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        request.terminal_number.as_deref().is_some_and(contains)
            || contains(&request.creator)
            || contains(&request.handler_name())
            || contains(request.status.as_str())
    }

    pub fn apply<'a>(&self, requests: &'a [HelpdeskRequest]) -> Vec<&'a HelpdeskRequest> {
        requests.iter().filter(|r| self.matches(r)).collect()
    }
}

pub fn sort_newest_first(requests: &mut [HelpdeskRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub fn new_queue(requests: &[HelpdeskRequest]) -> Vec<&HelpdeskRequest> {
    requests
        .iter()
        .filter(|r| r.status == RequestStatus::New)
        .collect()
}

// Очередь "Мои заявки": в работе и назначены на пользователя сессии
pub fn my_queue<'a>(requests: &'a [HelpdeskRequest], session: &Session) -> Vec<&'a HelpdeskRequest> {
    requests
        .iter()
        .filter(|r| r.status == RequestStatus::InProcess)
        .filter(|r| r.handler.as_ref().is_some_and(|h| h.is_user(session)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Handler, Role};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn request(id: i64, status: RequestStatus, creator: &str, handler: Option<&str>) -> HelpdeskRequest {
        HelpdeskRequest {
            id,
            creator: creator.to_string(),
            phone_number: None,
            description: String::new(),
            status,
            handler: handler.map(|name| Handler {
                id: None,
                username: Some(name.to_string()),
            }),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + chrono::Duration::minutes(id),
            terminal_id: Some(id),
            terminal_number: Some(format!("{}05", id)),
        }
    }

    fn sample() -> Vec<HelpdeskRequest> {
        vec![
            request(1, RequestStatus::New, "Иванов Иван", None),
            request(2, RequestStatus::InProcess, "Petrov", Some("aigerim")),
            request(3, RequestStatus::Closed, "Сидорова", Some("dauren")),
            request(4, RequestStatus::Closed, "Smith", Some("aigerim")),
        ]
    }

    fn ids(rows: Vec<&HelpdeskRequest>) -> Vec<i64> {
        rows.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn status_filter_is_case_insensitive() {
        let requests = sample();
        assert_eq!(ids(RequestFilter::new(Some("CLOSED"), None).apply(&requests)), vec![3, 4]);
        assert_eq!(ids(RequestFilter::new(Some("closed"), None).apply(&requests)), vec![3, 4]);
        assert_eq!(ids(RequestFilter::new(Some(""), None).apply(&requests)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn search_matches_any_display_field() {
        let requests = sample();
        // номер терминала
        assert_eq!(ids(RequestFilter::new(None, Some("305")).apply(&requests)), vec![3]);
        // создатель, кириллица без учёта регистра
        assert_eq!(ids(RequestFilter::new(None, Some("иванов")).apply(&requests)), vec![1]);
        // обработчик
        assert_eq!(ids(RequestFilter::new(None, Some("AIGER")).apply(&requests)), vec![2, 4]);
        // статус
        assert_eq!(ids(RequestFilter::new(None, Some("in_proc")).apply(&requests)), vec![2]);
        assert!(RequestFilter::new(None, Some("nobody")).apply(&requests).is_empty());
    }

    #[test]
    fn status_and_search_combine() {
        let requests = sample();
        let filter = RequestFilter::new(Some("CLOSED"), Some("aigerim"));
        assert_eq!(ids(filter.apply(&requests)), vec![4]);
    }

    #[test]
    fn sorts_newest_first() {
        let mut requests = sample();
        sort_newest_first(&mut requests);
        assert_eq!(requests.iter().map(|r| r.id).collect::<Vec<_>>(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn queues_split_by_status_and_handler() {
        let requests = sample();
        let session = Session {
            token: "t".to_string(),
            role: Role::Staff,
            user_id: 7,
            username: "aigerim".to_string(),
        };
        assert_eq!(ids(new_queue(&requests)), vec![1]);
        assert_eq!(ids(my_queue(&requests, &session)), vec![2]);
    }

    fn any_status() -> impl Strategy<Value = RequestStatus> {
        prop_oneof![
            Just(RequestStatus::New),
            Just(RequestStatus::InProcess),
            Just(RequestStatus::Closed),
        ]
    }

    proptest! {
        #[test]
        fn status_filter_returns_exact_subset(statuses in prop::collection::vec(any_status(), 0..40)) {
            let requests: Vec<HelpdeskRequest> = statuses
                .iter()
                .enumerate()
                .map(|(i, status)| request(i as i64, *status, "user", None))
                .collect();

            let filtered = RequestFilter::new(Some("closed"), None).apply(&requests);
            let expected = requests.iter().filter(|r| r.status == RequestStatus::Closed).count();
            prop_assert_eq!(filtered.len(), expected);
            prop_assert!(filtered.iter().all(|r| r.status == RequestStatus::Closed));
        }

        #[test]
        fn sorted_output_is_non_increasing(offsets in prop::collection::vec(0i64..100_000, 0..40)) {
            let mut requests: Vec<HelpdeskRequest> = offsets
                .iter()
                .enumerate()
                .map(|(i, offset)| {
                    let mut r = request(i as i64, RequestStatus::New, "user", None);
                    r.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + chrono::Duration::seconds(*offset);
                    r
                })
                .collect();
            sort_newest_first(&mut requests);
            prop_assert!(requests.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        }
    }
}
