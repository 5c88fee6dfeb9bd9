//! Human-readable notification messages.
//!
//! Product titles need a [`Subject::Product`], admin titles a
//! [`Subject::Admin`]. Section titles take a [`Subject::Section`] when one is
//! at hand and fall back to a generic sentence otherwise.
use catalog::{
    Vocabulary,
    admins::{AdminProfile, AdminStatus, Role},
    notifications::{NotificationKind, NotificationTitle},
    products::Product,
    sections::Section,
};

/// The entity a notification talks about.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Product(&'a Product),
    Admin(&'a AdminProfile),
    Section(&'a Section),
}

fn unavailable(title: NotificationTitle) -> String {
    format!(
        "Unable to describe \"{}\": {} details are missing",
        title.as_str(),
        title.kind().as_str()
    )
}

pub fn render(title: NotificationTitle, subject: Option<Subject>) -> String {
    use NotificationTitle::*;

    match (title.kind(), subject) {
        (NotificationKind::Product, Some(Subject::Product(product))) => {
            let name = &product.name;
            match title {
                ProductAdded => format!("New product \"{name}\" was added to the catalog"),
                ProductUpdated => format!("Product \"{name}\" was updated"),
                ProductDeleted => format!("Product \"{name}\" was removed from the catalog"),
                _ => format!("A new image was uploaded for product \"{name}\""),
            }
        }
        (NotificationKind::Admin, Some(Subject::Admin(admin))) => {
            let name = &admin.full_name;
            match title {
                AdminAdded => format!(
                    "{name} ({}) joined the team as {}",
                    admin.email,
                    admin.role.as_str()
                ),
                AdminSuspended => format!("{name}'s account was suspended"),
                AdminActivated => format!("{name}'s account was reactivated"),
                AdminDeleted => format!("{name}'s account was deleted"),
                AdminUpgraded => format!("{name} was promoted to manager"),
                AdminDowngraded => format!("{name} is now an admin"),
                ProfileUpdated => format!("{name} updated their profile"),
                _ => format!("{name} changed their password"),
            }
        }
        (NotificationKind::Section, Some(Subject::Section(section))) => {
            let name = &section.name;
            match title {
                SectionUpdated => match section.items.len() {
                    0 => format!("Section \"{name}\" was cleared"),
                    1 => format!("Section \"{name}\" now lists 1 product"),
                    count => format!("Section \"{name}\" now lists {count} products"),
                },
                _ => format!("A product was removed from section \"{name}\""),
            }
        }
        (NotificationKind::Section, None) => match title {
            SectionUpdated => "A section was updated".to_string(),
            _ => "A product was removed from a section".to_string(),
        },
        _ => unavailable(title),
    }
}

/// Title for a manager's status change, or `None` when the status is unchanged.
pub fn status_title(from: AdminStatus, to: AdminStatus) -> Option<NotificationTitle> {
    match (from, to) {
        (a, b) if a == b => None,
        (_, AdminStatus::Active) => Some(NotificationTitle::AdminActivated),
        (_, AdminStatus::Suspended) => Some(NotificationTitle::AdminSuspended),
        (_, AdminStatus::Deleted) => Some(NotificationTitle::AdminDeleted),
    }
}

pub fn role_title(from: Role, to: Role) -> Option<NotificationTitle> {
    match (from, to) {
        (Role::Admin, Role::Manager) => Some(NotificationTitle::AdminUpgraded),
        (Role::Manager, Role::Admin) => Some(NotificationTitle::AdminDowngraded),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use catalog::products::{Availability, ProductImages};
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: "p".repeat(24),
            name: "Aran Cardigan".to_string(),
            description: "Cable knit".to_string(),
            description_text: "Long description".to_string(),
            unisex: false,
            wool_percentage: 100.0,
            price: 180.0,
            release_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            availability: Availability::InStock,
            seasons: vec![],
            colors: vec![],
            images: ProductImages::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn admin() -> AdminProfile {
        let now = Utc::now();
        AdminProfile {
            id: "a".repeat(24),
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            role: Role::Admin,
            status: AdminStatus::Active,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_every_title_renders_with_its_subject() {
        let product = product();
        let admin = admin();
        let section = Section {
            id: "s".repeat(24),
            name: "Staff Picks".to_string(),
            description: String::new(),
            items: vec!["x".into(), "y".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        for title in NotificationTitle::ALL.iter().copied() {
            let subject = match title.kind() {
                NotificationKind::Product => Subject::Product(&product),
                NotificationKind::Admin => Subject::Admin(&admin),
                NotificationKind::Section => Subject::Section(&section),
            };
            let message = render(title, Some(subject));
            assert!(!message.starts_with("Unable"), "{title:?}: {message}");
        }

        assert_eq!(
            render(NotificationTitle::SectionUpdated, Some(Subject::Section(&section))),
            "Section \"Staff Picks\" now lists 2 products"
        );
        assert_eq!(
            render(NotificationTitle::ProductAdded, Some(Subject::Product(&product))),
            "New product \"Aran Cardigan\" was added to the catalog"
        );
    }

    #[test]
    fn test_missing_or_mismatched_subject() {
        let admin = admin();

        assert_eq!(
            render(NotificationTitle::ProductDeleted, None),
            "Unable to describe \"Product Deleted\": product details are missing"
        );
        assert_eq!(
            render(NotificationTitle::ProductUpdated, Some(Subject::Admin(&admin))),
            "Unable to describe \"Product Updated\": product details are missing"
        );
        assert_eq!(
            render(NotificationTitle::AdminAdded, None),
            "Unable to describe \"Admin Added\": admin details are missing"
        );
        assert_eq!(
            render(NotificationTitle::SectionUpdated, None),
            "A section was updated"
        );
    }

    #[test]
    fn test_status_title() {
        assert_eq!(status_title(AdminStatus::Active, AdminStatus::Active), None);
        assert_eq!(
            status_title(AdminStatus::Active, AdminStatus::Suspended),
            Some(NotificationTitle::AdminSuspended)
        );
        assert_eq!(
            status_title(AdminStatus::Suspended, AdminStatus::Active),
            Some(NotificationTitle::AdminActivated)
        );
        assert_eq!(
            role_title(Role::Manager, Role::Admin),
            Some(NotificationTitle::AdminDowngraded)
        );
        assert_eq!(role_title(Role::Admin, Role::Admin), None);
    }
}
