use std::collections::BTreeMap;

use super::{Participant, ParticipantId, ParticipantInfo, Side};

/// Participants of one battle keyed by id.
///
/// Iteration order is id order, so every scan over the roster is
/// reproducible.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    participants: BTreeMap<ParticipantId, Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_infos(infos: &[ParticipantInfo]) -> Self {
        let mut roster = Self::new();
        for info in infos {
            roster.insert(Participant::from_info(info));
        }
        roster
    }

    /// Inserts a participant, replacing any previous one with the same id.
    pub fn insert(&mut self, participant: Participant) -> Option<Participant> {
        self.participants
            .insert(participant.id.clone(), participant)
    }

    pub fn remove(&mut self, id: &str) -> Option<Participant> {
        self.participants.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Participant> {
        self.participants.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.participants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> + '_ {
        self.participants.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> + '_ {
        self.participants.values_mut()
    }

    pub fn living(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.iter().filter(|p| p.is_alive())
    }

    pub fn living_on(&self, side: Side) -> impl Iterator<Item = &Participant> + '_ {
        self.living().filter(move |p| p.side == side)
    }

    pub fn count_on(&self, side: Side) -> usize {
        self.iter().filter(|p| p.side == side).count()
    }

    /// True once every member of `side` is dead.
    pub fn is_defeated(&self, side: Side) -> bool {
        self.living_on(side).next().is_none()
    }
}
