//! Sample structure page shared by the calendar tests.

pub const STRUCTURE_PAGE: &str = r#"
<html><body>
<h2>Structura anului universitar 2025-2026</h2>
<p><strong>Linia de studiu română și engleză</strong></p>
<table>
  <tr><th colspan="3">SEMESTRUL I</th></tr>
  <tr><td>29.09.2025 - 21.12.2025</td><td>Activitate didactică</td><td>12 săptămâni</td></tr>
  <tr><td>22.12.2025 – 04.01.2026</td><td>Vacanța de iarnă</td><td></td></tr>
  <tr><td>05.01.2026 - 18.01.2026</td><td>Activitate didactică</td><td>2 săptămâni</td></tr>
  <tr><td>19.01.2026 — 08.02.2026</td><td>Sesiune de examene</td><td></td></tr>
  <tr><td>09.02.2026 - 15.02.2026</td><td>Vacanța intersemestrială</td><td></td></tr>
  <tr><td>16.02.2026 - 22.02.2026</td><td>Sesiune de restanțe</td><td></td></tr>
  <tr><th colspan="3">SEMESTRUL II - ani neterminali</th></tr>
  <tr><td>23.02.2026 - 12.04.2026</td><td>Activitate didactică</td><td></td></tr>
  <tr><td>13.04.2026 - 19.04.2026</td><td>Vacanța de Paști</td><td></td></tr>
  <tr><td>20.04.2026 - 07.06.2026</td><td>Activitate didactică</td><td></td></tr>
  <tr><td>08.06.2026 - 28.06.2026</td><td>Sesiune de examene</td><td></td></tr>
  <tr><th colspan="3">SEMESTRUL II - ani terminali</th></tr>
  <tr><td>23.02.2026 - 12.04.2026</td><td>Activitate didactică</td><td></td></tr>
  <tr><td>13.04.2026 - 19.04.2026</td><td>Vacanța de Paști</td><td></td></tr>
  <tr><td>20.04.2026 - 24.05.2026</td><td>Activitate didactică</td><td></td></tr>
  <tr><td>25.05.2026 - 14.06.2026</td><td>Sesiune de examene</td><td></td></tr>
  <tr><td>22.06.2026 - 05.07.2026</td><td>Examen de licență</td><td></td></tr>
</table>
<p><strong>Linia de studiu maghiară și germană</strong></p>
<table>
  <tr><th>SEMESTRUL I</th><th></th></tr>
  <tr><td>29.09.2025 - 21.12.2025</td><td>Activitate didactică</td></tr>
  <tr><td>22.12.2025 - 04.01.2026</td><td>Vacanța de iarnă</td></tr>
  <tr><td>01.12.2025</td><td>Zi liberă</td></tr>
</table>
</body></html>
"#;
