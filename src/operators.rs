// relay-diversity: Diversity Charts for the Relay Network by Family, AS, Country, and Operator
// Copyright (C) 2024-2025 The relay-diversity developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Ad-hoc operator grouping from the relay snapshot.
//!
//! The census tool cannot group by declared relay family, so the operator
//! view is built locally: filter the snapshot to running relays, resolve
//! operator labels, and greedily merge relays that declare each other as
//! family.

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::records::{Entry, RelayDetails, Snapshot};

lazy_static! {
    /// Known operator names by relay nickname. Applied to relays carrying
    /// the `Named` flag so that multi-relay operators show up under one
    /// label.
    static ref OPERATOR_ALIASES: BTreeMap<&'static str, &'static str> = {
        let operators: &[(&str, &[&str])] = &[
            ("∀ Torservers.net", &[
                "assk", "assk2", "bolobolo1", "bouazizi", "chomsky",
                "dorrisdeebrown", "gorz", "herngaard", "manning1", "manning2",
                "morales", "rainbowwarrior", "raskin", "sofia",
                "torserversNet1", "wannabe", "zeller",
            ]),
            ("∀ DFRI", &["DFRI0", "DFRI1", "DFRI3", "Kiruna", "maatuska", "ndnr1"]),
            ("∀ TorLand", &["TorLand1", "TorLand2"]),
            ("∀ Random Person", &[
                "Revisited", "Windmill2", "Riviera2", "Anthracite", "Paint",
                "Hymen2", "Frontier2", "Samo", "Lithium2", "AndBeans",
                "Barbecue", "Firebird", "Frontier", "WallyWorld", "Falcon",
                "Bohemian", "CzechMate", "Monk", "NoWay", "MrSnow",
                "BearNecessities", "BearlyLegal", "Stefan3", "BikiniTeam",
                "2ndCity", "Dragon",
            ]),
            ("∀ Team Cymru", &[
                "GoldDragon", "Ramsgate", "BigBoy", "RedDragon", "GreenDragon",
                "WhiteDragon",
            ]),
        ];
        operators
            .iter()
            .flat_map(|(operator, nicks)| nicks.iter().map(move |nick| (*nick, *operator)))
            .collect()
    };
}

/// Family membership test for one seed relay, following the census data
/// model: a candidate is accepted if its declared family mentions the seed
/// by `$<FINGERPRINT>` or by nickname.
///
/// Mentions are direction-sensitive: the seed declaring the candidate is not
/// sufficient. The test is therefore neither symmetric nor transitive.
pub struct FamilyFilter {
    fingerprint_mention: String,
    nickname: Option<String>,
}

impl FamilyFilter {
    pub fn new(seed: &RelayDetails) -> Self {
        FamilyFilter {
            fingerprint_mention: format!("${}", seed.fingerprint),
            nickname: (!seed.nickname.is_empty()).then(|| seed.nickname.clone()),
        }
    }

    /// Whether `relay` declares the seed as part of its family.
    pub fn accept(&self, relay: &RelayDetails) -> bool {
        relay.family.iter().any(|mention| {
            mention == &self.fingerprint_mention
                || self.nickname.as_deref() == Some(mention.as_str())
        })
    }
}

/// Greedily merge the running relays of the snapshot into operator
/// aggregates.
///
/// Seeds are taken in fingerprint order, so a given snapshot always produces
/// the same grouping. Each seed absorbs every still-remaining relay accepted
/// by its family filter; because the acceptance test is not transitive, an
/// aggregate can chain relays that never mention each other directly.
pub fn group_by_family(snapshot: &Snapshot) -> Vec<Entry> {
    let mut remaining: BTreeMap<&str, &RelayDetails> = snapshot
        .relays
        .iter()
        .filter(|relay| relay.running)
        .map(|relay| (relay.fingerprint.as_str(), relay))
        .collect();
    log::debug!("loaded {} running relays", remaining.len());

    let mut operators = Vec::new();
    while let Some((_, seed)) = remaining.pop_first() {
        let filter = FamilyFilter::new(seed);
        let mut entry = relay_entry(seed);
        let mut count = 1;

        let mut absorbed = Vec::new();
        remaining.retain(|_, relay| {
            if filter.accept(relay) {
                absorbed.push(*relay);
                false
            } else {
                true
            }
        });
        for relay in absorbed {
            entry.cw += percent(relay.consensus_weight_fraction);
            entry.adv_bw += percent(relay.advertised_bandwidth_fraction);
            entry.p_guard += percent(relay.guard_probability);
            entry.p_middle += percent(relay.middle_probability);
            entry.p_exit += percent(relay.exit_probability);
            count += 1;
        }

        entry.fp = Some(format!("({count} relays)"));
        operators.push(entry);
    }
    log::debug!("merged into {} operator groups", operators.len());

    operators
}

/// Resolve the display label of a single relay: verified names may map to a
/// known operator alias, unverified relays are labeled by fingerprint.
fn relay_label(relay: &RelayDetails) -> String {
    if relay.flags.iter().any(|flag| flag == "Named") {
        match OPERATOR_ALIASES.get(relay.nickname.as_str()) {
            Some(operator) => (*operator).to_string(),
            None => relay.nickname.clone(),
        }
    } else {
        format!("${}", relay.fingerprint)
    }
}

/// Seed entry for one relay, with the snapshot's 0..=1 fractions scaled to
/// percentages.
fn relay_entry(relay: &RelayDetails) -> Entry {
    Entry {
        nick: Some(relay_label(relay)),
        cw: percent(relay.consensus_weight_fraction),
        adv_bw: percent(relay.advertised_bandwidth_fraction),
        p_guard: percent(relay.guard_probability),
        p_middle: percent(relay.middle_probability),
        p_exit: percent(relay.exit_probability),
        ..Default::default()
    }
}

fn percent(fraction: f64) -> f64 {
    fraction * 100.0
}

#[cfg(test)]
mod test {
    use super::*;

    fn relay(nickname: &str, fingerprint: &str) -> RelayDetails {
        RelayDetails {
            nickname: nickname.to_string(),
            fingerprint: fingerprint.to_string(),
            flags: vec!["Running".to_string()],
            running: true,
            family: Vec::new(),
            consensus_weight_fraction: 0.0,
            advertised_bandwidth_fraction: 0.0,
            guard_probability: 0.0,
            middle_probability: 0.0,
            exit_probability: 0.0,
        }
    }

    fn snapshot(relays: Vec<RelayDetails>) -> Snapshot {
        Snapshot {
            relays_published: "2013-06-20 12:00:00".to_string(),
            relays,
        }
    }

    #[test]
    fn acceptance_is_direction_sensitive() {
        let mut seed = relay("alpha", "AAAA");
        seed.family = vec!["$BBBB".to_string()];
        let mut mentions_seed = relay("beta", "BBBB");
        mentions_seed.family = vec!["$AAAA".to_string()];
        let silent = relay("gamma", "CCCC");

        let filter = FamilyFilter::new(&seed);
        assert!(filter.accept(&mentions_seed));
        // the seed mentioning gamma does not make gamma a member
        assert!(!filter.accept(&silent));
    }

    #[test]
    fn acceptance_matches_nickname_mentions() {
        let seed = relay("alpha", "AAAA");
        let mut by_nick = relay("beta", "BBBB");
        by_nick.family = vec!["alpha".to_string()];

        assert!(FamilyFilter::new(&seed).accept(&by_nick));
    }

    #[test]
    fn grouping_absorbs_relays_that_mention_the_seed() {
        let mut seed = relay("alpha", "AAAA");
        seed.consensus_weight_fraction = 0.01;
        seed.exit_probability = 0.02;
        let mut member = relay("beta", "BBBB");
        member.family = vec!["$AAAA".to_string()];
        member.consensus_weight_fraction = 0.02;
        member.exit_probability = 0.01;
        let loner = relay("gamma", "CCCC");

        let ops = group_by_family(&snapshot(vec![seed, member, loner]));
        assert_eq!(ops.len(), 2);

        // seeds are taken in fingerprint order, AAAA first
        assert_eq!(ops[0].fp.as_deref(), Some("(2 relays)"));
        assert!((ops[0].cw - 3.0).abs() < 1e-9);
        assert!((ops[0].p_exit - 3.0).abs() < 1e-9);
        assert_eq!(ops[1].fp.as_deref(), Some("(1 relays)"));
    }

    #[test]
    fn grouping_skips_non_running_relays() {
        let mut down = relay("alpha", "AAAA");
        down.running = false;
        let up = relay("beta", "BBBB");

        let ops = group_by_family(&snapshot(vec![down, up]));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].nick.as_deref(), Some("$BBBB"));
    }

    #[test]
    fn grouping_is_deterministic() {
        let relays = vec![relay("c", "CCCC"), relay("a", "AAAA"), relay("b", "BBBB")];
        let first = group_by_family(&snapshot(relays.clone()));
        let second = group_by_family(&snapshot(relays));

        let labels = |ops: &[Entry]| -> Vec<String> {
            ops.iter().map(|op| op.nick.clone().unwrap()).collect()
        };
        assert_eq!(labels(&first), labels(&second));
        assert_eq!(labels(&first), vec!["$AAAA", "$BBBB", "$CCCC"]);
    }

    #[test]
    fn named_relays_resolve_operator_aliases() {
        let mut named = relay("DFRI1", "AAAA");
        named.flags.push("Named".to_string());
        let mut named_unknown = relay("somerelay", "BBBB");
        named_unknown.flags.push("Named".to_string());
        let unnamed = relay("DFRI1", "CCCC");

        let ops = group_by_family(&snapshot(vec![named, named_unknown, unnamed]));
        let labels: Vec<&str> = ops.iter().map(|op| op.nick.as_deref().unwrap()).collect();
        assert_eq!(labels, vec!["∀ DFRI", "somerelay", "$CCCC"]);
    }

    #[test]
    fn fractions_scale_to_percentages() {
        let mut seed = relay("alpha", "AAAA");
        seed.consensus_weight_fraction = 0.123;
        seed.advertised_bandwidth_fraction = 0.2;
        seed.guard_probability = 0.05;
        seed.middle_probability = 0.06;
        seed.exit_probability = 0.07;

        let ops = group_by_family(&snapshot(vec![seed]));
        assert!((ops[0].cw - 12.3).abs() < 1e-9);
        assert!((ops[0].adv_bw - 20.0).abs() < 1e-9);
        assert!((ops[0].p_guard - 5.0).abs() < 1e-9);
        assert!((ops[0].p_middle - 6.0).abs() < 1e-9);
        assert!((ops[0].p_exit - 7.0).abs() < 1e-9);
    }
}
