//! Prozesslokaler Read-Through-Cache fuer Profilansichten
//!
//! Eintraege entstehen beim ersten Lesen und verschwinden nur durch
//! explizites Invalidieren; es gibt keine TTL. Jeder Eintrag fuehrt eine
//! Schreib-Generation, dazu zaehlt der Cache eine globale Epoche, die bei
//! jedem Entfernen steigt. Ein Miss-Fill merkt sich beides vor dem Lesen
//! aus dem Store und wird verworfen, wenn seitdem invalidiert oder gepatcht
//! wurde. So kann ein langsamer Leser keinen veralteten Wert zurueck in den
//! Cache schreiben, ohne dass entfernte Schluessel Spuren hinterlassen.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use campushub_core::KontoId;
use campushub_db::{FotoArt, ProfilAnsicht};

#[derive(Debug)]
struct CacheEintrag {
    ansicht: ProfilAnsicht,
    generation: u64,
}

/// Schnappschuss fuer einen Miss-Fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesemarke {
    generation: Option<u64>,
    epoche: u64,
}

#[derive(Debug, Default)]
pub struct ProfilCache {
    eintraege: DashMap<KontoId, CacheEintrag>,
    // Wird nur unter dem Shard-Lock des betroffenen Schluessels erhoeht
    epoche: AtomicU64,
    treffer: AtomicU64,
    fehlgriffe: AtomicU64,
}

impl ProfilCache {
    pub fn neu() -> Self {
        Self::default()
    }

    pub fn get(&self, id: KontoId) -> Option<ProfilAnsicht> {
        let ansicht = self.eintraege.get(&id).map(|e| e.ansicht.clone());
        let zaehler = if ansicht.is_some() {
            &self.treffer
        } else {
            &self.fehlgriffe
        };
        zaehler.fetch_add(1, Ordering::Relaxed);
        ansicht
    }

    /// Muss vor dem Lesen aus dem Store genommen werden
    pub fn lesemarke(&self, id: KontoId) -> Lesemarke {
        // Generation zuerst, damit ein Entfernen dazwischen die Epoche aendert
        let generation = self.eintraege.get(&id).map(|e| e.generation);
        Lesemarke {
            generation,
            epoche: self.epoche.load(Ordering::SeqCst),
        }
    }

    /// Ueberschreibt den Eintrag bedingungslos
    pub fn put(&self, id: KontoId, ansicht: ProfilAnsicht) {
        match self.eintraege.entry(id) {
            Entry::Occupied(mut o) => {
                let eintrag = o.get_mut();
                eintrag.generation += 1;
                eintrag.ansicht = ansicht;
            }
            Entry::Vacant(v) => {
                v.insert(CacheEintrag {
                    ansicht,
                    generation: 1,
                });
            }
        }
    }

    /// Fuegt nur ein, wenn seit `marke` nichts geschrieben wurde
    pub fn put_wenn_aktuell(&self, id: KontoId, ansicht: ProfilAnsicht, marke: Lesemarke) -> bool {
        let eintrag = self.eintraege.entry(id);
        if self.epoche.load(Ordering::SeqCst) != marke.epoche {
            return false;
        }
        match eintrag {
            Entry::Occupied(mut o) if marke.generation == Some(o.get().generation) => {
                let eintrag = o.get_mut();
                eintrag.generation += 1;
                eintrag.ansicht = ansicht;
                true
            }
            Entry::Vacant(v) if marke.generation.is_none() => {
                v.insert(CacheEintrag {
                    ansicht,
                    generation: 1,
                });
                true
            }
            _ => false,
        }
    }

    /// Entfernt den Eintrag; unbekannte Schluessel hinterlassen nichts
    pub fn invalidieren(&self, id: KontoId) {
        match self.eintraege.entry(id) {
            Entry::Occupied(o) => {
                self.epoche.fetch_add(1, Ordering::SeqCst);
                o.remove();
            }
            Entry::Vacant(_) => {
                self.epoche.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Ersetzt genau ein Fotofeld, falls der Eintrag vorhanden ist
    ///
    /// Gibt `true` zurueck wenn gepatcht wurde. Ein laufender Miss-Fill
    /// wird in beiden Faellen verworfen, damit er das alte Foto nicht
    /// einsetzt.
    pub fn foto_patchen(&self, id: KontoId, art: FotoArt, url: &str) -> bool {
        match self.eintraege.entry(id) {
            Entry::Occupied(mut o) => {
                let eintrag = o.get_mut();
                eintrag.generation += 1;
                eintrag.ansicht.foto_setzen(art, url);
                true
            }
            Entry::Vacant(_) => {
                self.epoche.fetch_add(1, Ordering::SeqCst);
                false
            }
        }
    }

    /// Anzahl gecachter Ansichten
    pub fn len(&self) -> usize {
        self.eintraege.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eintraege.is_empty()
    }

    pub fn treffer(&self) -> u64 {
        self.treffer.load(Ordering::Relaxed)
    }

    pub fn fehlgriffe(&self) -> u64 {
        self.fehlgriffe.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campushub_db::ProfilRecord;
    use chrono::Utc;

    fn ansicht(id: i64, name: &str) -> ProfilAnsicht {
        ProfilAnsicht {
            konto_id: KontoId(id),
            email: format!("k{id}@x.edu"),
            is_admin: false,
            profil: ProfilRecord {
                full_name: Some(name.into()),
                profile_photo: Some("alt.png".into()),
                ..Default::default()
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn get_zaehlt_treffer_und_fehlgriffe() {
        let cache = ProfilCache::neu();
        assert!(cache.get(KontoId(1)).is_none());
        cache.put(KontoId(1), ansicht(1, "A"));
        assert!(cache.get(KontoId(1)).is_some());
        assert_eq!((cache.treffer(), cache.fehlgriffe()), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidieren_entfernt_ansicht() {
        let cache = ProfilCache::neu();
        cache.put(KontoId(1), ansicht(1, "A"));
        cache.invalidieren(KontoId(1));
        assert!(cache.get(KontoId(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn veralteter_miss_fill_wird_verworfen() {
        let cache = ProfilCache::neu();
        let id = KontoId(1);

        // Leser nimmt Marke und liest den alten Stand ...
        let marke = cache.lesemarke(id);
        let alt = ansicht(1, "Alt");
        // ... waehrenddessen schreibt jemand und invalidiert
        cache.invalidieren(id);

        assert!(!cache.put_wenn_aktuell(id, alt, marke));
        assert!(cache.get(id).is_none());

        let marke = cache.lesemarke(id);
        assert!(cache.put_wenn_aktuell(id, ansicht(1, "Neu"), marke));
        assert_eq!(
            cache.get(id).unwrap().profil.full_name.as_deref(),
            Some("Neu")
        );
    }

    #[test]
    fn foto_patch_nur_wenn_vorhanden() {
        let cache = ProfilCache::neu();
        assert!(!cache.foto_patchen(KontoId(1), FotoArt::Profile, "neu.png"));
        assert!(cache.get(KontoId(1)).is_none());

        cache.put(KontoId(1), ansicht(1, "A"));
        assert!(cache.foto_patchen(KontoId(1), FotoArt::Cover, "cover.png"));
        let a = cache.get(KontoId(1)).unwrap();
        assert_eq!(a.profil.cover_photo.as_deref(), Some("cover.png"));
        assert_eq!(a.profil.profile_photo.as_deref(), Some("alt.png"));
        assert_eq!(a.profil.full_name.as_deref(), Some("A"));
    }

    #[test]
    fn foto_patch_verwirft_laufenden_miss_fill() {
        let cache = ProfilCache::neu();
        let marke = cache.lesemarke(KontoId(1));
        cache.foto_patchen(KontoId(1), FotoArt::Profile, "neu.png");
        assert!(!cache.put_wenn_aktuell(KontoId(1), ansicht(1, "A"), marke));
    }

    #[test]
    fn unbekannte_schluessel_hinterlassen_keine_eintraege() {
        let cache = ProfilCache::neu();
        for id in 0..100 {
            cache.invalidieren(KontoId(id));
            cache.foto_patchen(KontoId(id), FotoArt::Cover, "x.png");
        }
        assert!(cache.is_empty());
        assert_eq!(cache.eintraege.len(), 0);

        cache.put(KontoId(1), ansicht(1, "A"));
        cache.invalidieren(KontoId(1));
        assert_eq!(cache.eintraege.len(), 0);
    }

    #[test]
    fn miss_fill_nach_entfernen_eines_gecachten_eintrags_verworfen() {
        let cache = ProfilCache::neu();
        let id = KontoId(1);
        cache.put(id, ansicht(1, "Alt"));

        // Marke auf den vorhandenen Eintrag, dann Entfernen
        let marke = cache.lesemarke(id);
        cache.invalidieren(id);
        assert!(!cache.put_wenn_aktuell(id, ansicht(1, "Alt"), marke));
        assert!(cache.get(id).is_none());
    }

    #[test]
    fn schluessel_sind_unabhaengig() {
        let cache = ProfilCache::neu();
        cache.put(KontoId(1), ansicht(1, "A"));
        cache.put(KontoId(2), ansicht(2, "B"));
        cache.invalidieren(KontoId(1));
        assert!(cache.get(KontoId(2)).is_some());
    }
}
