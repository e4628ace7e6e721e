//! Translation tables, one per locale.
//!
//! The `app_title`, `menu_*`, `tab_*`, `btn_*`, `select_*` and `scan_log`
//! entries label a graphical presentation layer. The command-line front end
//! does not look them up.

pub(super) const EN: &[(&str, &str)] = &[
    ("app_title", "ClamAV GUI Pro - Professional Antivirus"),
    ("menu_file", "&File"),
    ("menu_scan", "&Scan"),
    ("menu_update", "&Update"),
    ("menu_tools", "&Tools"),
    ("menu_help", "&Help"),
    ("menu_exit", "E&xit"),
    ("menu_quick_scan", "Quick Scan"),
    ("menu_full_scan", "Full System Scan"),
    ("menu_update_virus_db", "Update Virus Databases"),
    ("menu_update_program", "Update Program"),
    ("menu_about", "About"),
    ("tab_scan", "Scan"),
    ("tab_update", "Update"),
    ("tab_quarantine", "Quarantine"),
    ("tab_history", "History"),
    ("tab_statistics", "Statistics"),
    ("tab_realtime", "Real-time"),
    ("tab_settings", "Settings"),
    ("btn_scan_file", "Scan File"),
    ("btn_scan_folder", "Scan Folder"),
    ("btn_quick_scan", "Quick Scan"),
    ("scan_log", "Scan Log:"),
    ("quarantine_title", "Quarantined Files:"),
    ("quarantine_empty", "Quarantine is empty."),
    ("restore_file", "Restore"),
    ("delete_permanent", "Delete"),
    ("restored", "Restored to {path}"),
    ("deleted", "Deleted {name}"),
    (
        "about_text",
        "ClamAV GUI Pro v{version}\nFront end for the ClamAV scanner with quarantine support.\nLicense: GPL v3",
    ),
    ("select_file", "Select file"),
    ("select_folder", "Select folder"),
    ("ready", "Ready"),
    ("files_scanned", "Files scanned:"),
    ("infected", "Infected:"),
    ("scan_complete", "Scan Complete"),
    ("scan_clean", "{count} files scanned. No threats."),
    ("threats_found", "{count} infected file(s) found!"),
    ("moved_to_quarantine", "{count} moved to quarantine."),
    ("quarantine_failed", "Quarantine failed: {error}"),
    ("updating", "Updating databases..."),
    ("updated", "Updated!"),
    ("already_current", "Already up to date"),
    ("update_complete", "Update complete!"),
    ("cancelled", "Cancelled."),
    ("error_message", "Error: {error}"),
    ("no_quick_scan_target", "Neither Downloads nor Desktop exists, nothing to scan."),
    (
        "program_update_notice",
        "Current version: {version}\nCheck GitHub for updates!",
    ),
    ("language_changed", "Language set to {language}."),
    ("admin_title", "Admin Permissions"),
    (
        "admin_notice",
        "Some operations require administrator privileges:\n\n- Updating databases\n- Real-time protection\n- System scans\n\nYou will be prompted when needed.",
    ),
    ("installing_engine", "Installing ClamAV..."),
    ("engine_installed", "ClamAV installed!"),
    ("engine_install_failed", "Error installing ClamAV"),
    ("restarting", "Restarting..."),
];

pub(super) const PT: &[(&str, &str)] = &[
    ("app_title", "ClamAV GUI Pro - Antivírus Profissional"),
    ("menu_file", "&Ficheiro"),
    ("menu_scan", "&Verificar"),
    ("menu_update", "&Atualizar"),
    ("menu_tools", "&Ferramentas"),
    ("menu_help", "Aj&uda"),
    ("menu_exit", "&Sair"),
    ("menu_quick_scan", "Verificação Rápida"),
    ("menu_full_scan", "Verificação Completa"),
    ("menu_update_virus_db", "Atualizar Bases de Vírus"),
    ("menu_update_program", "Atualizar Programa"),
    ("menu_about", "Sobre"),
    ("tab_scan", "Verificar"),
    ("tab_update", "Atualizar"),
    ("tab_quarantine", "Quarentena"),
    ("tab_history", "Histórico"),
    ("tab_statistics", "Estatísticas"),
    ("tab_realtime", "Tempo Real"),
    ("tab_settings", "Definições"),
    ("btn_scan_file", "Verificar Ficheiro"),
    ("btn_scan_folder", "Verificar Pasta"),
    ("btn_quick_scan", "Verificação Rápida"),
    ("scan_log", "Registo:"),
    ("quarantine_title", "Ficheiros em Quarentena:"),
    ("quarantine_empty", "A quarentena está vazia."),
    ("restore_file", "Restaurar"),
    ("delete_permanent", "Eliminar"),
    ("restored", "Restaurado para {path}"),
    ("deleted", "Eliminado {name}"),
    (
        "about_text",
        "ClamAV GUI Pro v{version}\nInterface para o antivírus ClamAV com quarentena.\nLicença: GPL v3",
    ),
    ("select_file", "Selecionar ficheiro"),
    ("select_folder", "Selecionar pasta"),
    ("ready", "Pronto"),
    ("files_scanned", "Ficheiros verificados:"),
    ("infected", "Infectados:"),
    ("scan_complete", "Verificação Completa"),
    ("scan_clean", "{count} ficheiros verificados. Sem ameaças."),
    ("threats_found", "{count} ficheiro(s) infectado(s) encontrado(s)!"),
    ("moved_to_quarantine", "{count} movido(s) para a quarentena."),
    ("quarantine_failed", "Falha na quarentena: {error}"),
    ("updating", "A atualizar bases de dados..."),
    ("updated", "Atualizado!"),
    ("already_current", "Já está atualizado"),
    ("update_complete", "Atualização concluída!"),
    ("cancelled", "Cancelado."),
    ("error_message", "Erro: {error}"),
    (
        "program_update_notice",
        "Versão atual: {version}\nConsulte o GitHub para atualizações!",
    ),
    ("language_changed", "Idioma definido para {language}."),
    ("admin_title", "Permissões de Administrador"),
];
