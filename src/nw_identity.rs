// Roster based identity source for synthetic agents
//
// Names are drawn from small fixed rosters. A coin flip picks the gender first so
// first name and surname always agree.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::nw_interface::{Identity, IdentitySource};

const MALE_FIRST_NAMES: &[&str] = &[
    "Ivan", "Petr", "Sergei", "Dmitri", "Andrei", "Konstantin", "Alexei", "Nikita", "Vladimir",
];
const FEMALE_FIRST_NAMES: &[&str] = &[
    "Anna", "Olga", "Elena", "Maria", "Svetlana", "Tatiana", "Natalia", "Irina", "Ekaterina",
];

const MALE_LAST_NAMES: &[&str] = &[
    "Petrov", "Sidorov", "Voronov", "Novikov", "Vasiliev", "Smirnov", "Kuznetsov", "Popov",
    "Lebedev", "Ivanov",
];
const FEMALE_LAST_NAMES: &[&str] = &[
    "Petrova", "Sidorova", "Voronova", "Novikova", "Vasilieva", "Smirnova", "Kuznetsova",
    "Popova", "Lebedeva", "Ivanova",
];

const EMAIL_DOMAIN: &str = "example.com";

/// Default [`IdentitySource`] used by the store
#[derive(Debug, Clone, Default)]
pub struct RosterIdentities;

impl RosterIdentities {
    pub fn new() -> Self {
        Self
    }
}

fn pick<'a>(roster: &[&'a str], rng: &mut dyn RngCore) -> &'a str {
    // rosters are non-empty constants
    roster.choose(rng).copied().unwrap_or("Agent")
}

/// Build `first.last@example.com`, lowercased
pub fn email_for(first: &str, last: &str) -> String {
    format!("{}.{}@{}", first, last, EMAIL_DOMAIN).to_lowercase()
}

impl IdentitySource for RosterIdentities {
    fn next_identity(&mut self, rng: &mut dyn RngCore) -> Identity {
        let male = rng.gen_bool(0.5);
        let (first, last) = if male {
            (pick(MALE_FIRST_NAMES, rng), pick(MALE_LAST_NAMES, rng))
        } else {
            (pick(FEMALE_FIRST_NAMES, rng), pick(FEMALE_LAST_NAMES, rng))
        };

        Identity {
            name: format!("{} {}", first, last),
            email: email_for(first, last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_email_is_lowercase() {
        assert_eq!(email_for("Anna", "Popova"), "anna.popova@example.com");
    }

    #[test]
    fn test_name_and_surname_agree() {
        let mut rng = StdRng::from_seed([3u8; 32]);
        let mut identities = RosterIdentities::new();

        for _ in 0..200 {
            let identity = identities.next_identity(&mut rng);
            let mut parts = identity.name.split(' ');
            let first = parts.next().unwrap();
            let last = parts.next().unwrap();

            if MALE_FIRST_NAMES.contains(&first) {
                assert!(MALE_LAST_NAMES.contains(&last), "{}", identity.name);
            } else {
                assert!(FEMALE_FIRST_NAMES.contains(&first), "{}", identity.name);
                assert!(FEMALE_LAST_NAMES.contains(&last), "{}", identity.name);
            }
            assert_eq!(identity.email, email_for(first, last));
        }
    }

    #[test]
    fn test_same_seed_same_identities() {
        let mut a = StdRng::from_seed([9u8; 32]);
        let mut b = StdRng::from_seed([9u8; 32]);
        let mut identities = RosterIdentities::new();

        for _ in 0..20 {
            assert_eq!(
                identities.next_identity(&mut a),
                identities.next_identity(&mut b)
            );
        }
    }
}
