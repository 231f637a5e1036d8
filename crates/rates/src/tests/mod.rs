mod workbook_loading;
