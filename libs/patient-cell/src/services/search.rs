use shared_models::Patient;

/// Lazy view over one store snapshot, filtered by a case-insensitive needle.
///
/// Each search builds a new `PatientMatches` from a fresh read; the iterator is
/// not restartable.
#[derive(Debug)]
pub struct PatientMatches {
    snapshot: std::vec::IntoIter<Patient>,
    needle: Option<String>,
}

impl PatientMatches {
    pub fn new(snapshot: Vec<Patient>, query: Option<&str>) -> Self {
        let needle = query
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        Self {
            snapshot: snapshot.into_iter(),
            needle,
        }
    }
}

impl Iterator for PatientMatches {
    type Item = Patient;

    fn next(&mut self) -> Option<Patient> {
        let needle = self.needle.as_deref();
        self.snapshot.find(|patient| matches_query(patient, needle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (_, upper) = self.snapshot.size_hint();
        match self.needle {
            Some(_) => (0, upper),
            None => self.snapshot.size_hint(),
        }
    }
}

/// `needle` must already be lowercased.
pub fn matches_query(patient: &Patient, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };

    patient.full_name.to_lowercase().contains(needle)
        || patient
            .phone_number
            .as_deref()
            .is_some_and(|phone| phone.to_lowercase().contains(needle))
}
